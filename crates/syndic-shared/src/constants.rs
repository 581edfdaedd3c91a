//! Application-wide constants

pub const JOIN_CODE_LENGTH: usize = 8;
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const COLLECTION_USERS: &str = "users";
pub const COLLECTION_APARTMENTS: &str = "apartments";
pub const COLLECTION_RESIDENTS: &str = "residents";
pub const COLLECTION_EXPENSES: &str = "expenses";
pub const COLLECTION_ISSUES: &str = "issues";
pub const COLLECTION_MEETINGS: &str = "meetings";

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M";

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 5;
pub const DEFAULT_UPLOAD_TIMEOUT_SECONDS: u64 = 30;
pub const MIN_PASSWORD_LENGTH: u64 = 6;
