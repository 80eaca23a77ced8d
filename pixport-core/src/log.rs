//! Log hook for the UI library's text logger
//!
//! The UI library emits preformatted lines such as
//! `"[Warn]\t(1.234, +5)\t lv_obj_create: no parent\n"`. The hook parses
//! the level prefix so the firmware can route each line to the matching
//! `defmt` level, and keeps the most recent lines in a small ring buffer.

use heapless::{Deque, String};

/// Maximum number of records kept in a [`LogBuffer`]
pub const LOG_ENTRIES: usize = 16;

/// Maximum characters kept per message
pub const LOG_MSG_LEN: usize = 96;

/// Function handed to the UI library at init to receive log lines
pub type LogHook = fn(&str);

/// Log severity as reported by the UI library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogLevel {
    Trace,
    #[default]
    Info,
    Warn,
    Error,
    /// Lines logged by application code through the library
    User,
}

impl LogLevel {
    /// Match a bracketed prefix body such as `Warn`
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "Trace" => Some(Self::Trace),
            "Info" => Some(Self::Info),
            "Warn" => Some(Self::Warn),
            "Error" => Some(Self::Error),
            "User" => Some(Self::User),
            _ => None,
        }
    }
}

/// One parsed log line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogRecord {
    pub level: LogLevel,
    /// Message without level prefix or trailing newline, truncated
    pub message: String<LOG_MSG_LEN>,
}

impl LogRecord {
    /// Parse a raw line from the UI library
    ///
    /// Lines without a recognised `[Level]` prefix are kept whole at
    /// [`LogLevel::Info`].
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end();
        let (level, body) = split_level(line);

        let mut message = String::new();
        for ch in body.trim_start().chars() {
            if message.push(ch).is_err() {
                break;
            }
        }

        Self { level, message }
    }

    pub fn as_str(&self) -> &str {
        self.message.as_str()
    }
}

fn split_level(line: &str) -> (LogLevel, &str) {
    if let Some(rest) = line.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            if let Some(level) = LogLevel::from_prefix(&rest[..end]) {
                return (level, &rest[end + 1..]);
            }
        }
    }
    (LogLevel::Info, line)
}

/// Ring of the most recent log records (oldest dropped first)
pub struct LogBuffer {
    entries: Deque<LogRecord, LOG_ENTRIES>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Append a record, dropping the oldest when full
    pub fn push(&mut self, record: LogRecord) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // Cannot fail: a slot was freed above
        let _ = self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LogBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LogBuffer({} records)", self.len());
        for record in self.iter() {
            defmt::write!(f, "\n  {}", record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_warn_line() {
        let record = LogRecord::parse("[Warn]\t(1.234, +5)\t lv_obj_create: no parent\n");
        assert_eq!(record.level, LogLevel::Warn);
        assert_eq!(record.as_str(), "(1.234, +5)\t lv_obj_create: no parent");
    }

    #[test]
    fn test_parse_all_levels() {
        assert_eq!(LogRecord::parse("[Trace] a").level, LogLevel::Trace);
        assert_eq!(LogRecord::parse("[Info] a").level, LogLevel::Info);
        assert_eq!(LogRecord::parse("[Error] a").level, LogLevel::Error);
        assert_eq!(LogRecord::parse("[User] a").level, LogLevel::User);
    }

    #[test]
    fn test_parse_without_prefix() {
        let record = LogRecord::parse("plain text\r\n");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.as_str(), "plain text");

        let record = LogRecord::parse("[Bogus] kept whole");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.as_str(), "[Bogus] kept whole");
    }

    #[test]
    fn test_long_message_truncated() {
        let line = "[Info] 0123456789012345678901234567890123456789012345678901234567890123456789012345678901234567890123456789";
        let record = LogRecord::parse(line);
        assert_eq!(record.message.len(), LOG_MSG_LEN);
        assert!(record.as_str().starts_with("0123"));
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let mut buffer = LogBuffer::new();
        assert!(buffer.is_empty());

        for i in 0..(LOG_ENTRIES + 2) {
            let mut line: String<8> = String::new();
            let _ = core::fmt::write(&mut line, format_args!("{}", i));
            buffer.push(LogRecord::parse(line.as_str()));
        }

        assert_eq!(buffer.len(), LOG_ENTRIES);
        let first = buffer.iter().next().map(|r| r.as_str());
        assert_eq!(first, Some("2"));
        let last = buffer.iter().last().map(|r| r.as_str());
        assert_eq!(last, Some("17"));
    }

    #[cfg(feature = "defmt")]
    #[test]
    fn test_log_types_are_defmt_formattable() {
        fn is_format<T: defmt::Format>() {}
        is_format::<LogRecord>();
        is_format::<LogBuffer>();
    }
}
