pub struct Icons;

impl Icons {
    pub const BOOKS: &str = "📚";
    pub const BOOK: &str = "📖";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const NEW: &str = "✨";
    pub const DATABASE: &str = "🗄️";
    pub const PHONE: &str = "📱";
    pub const EMPTY: &str = "∅";
}
