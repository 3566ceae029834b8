use std::sync::Arc;

use webengine::log::{LogEntry, LogLevel, Logger, MemorySink};

#[test]
fn test_logger_records_component_message_and_level() {
    let sink = Arc::new(MemorySink::new());
    let logger = Logger::new("WebServer", sink.clone());

    logger.verbose("v");
    logger.info("i");
    logger.warning("w");
    logger.error("e");

    let entries = sink.entries();
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries[2],
        LogEntry {
            component: "WebServer".to_string(),
            message: "w".to_string(),
            level: LogLevel::Warning,
        }
    );
    assert_eq!(sink.at_level(LogLevel::Error).len(), 1);
}

#[test]
fn test_scoped_logger_shares_sink() {
    let sink = Arc::new(MemorySink::new());
    let root = Logger::new("root", sink.clone());
    let child = root.scoped("child");

    root.info("from root");
    child.info("from child");

    let components: Vec<String> = sink.entries().into_iter().map(|e| e.component).collect();
    assert_eq!(components, vec!["root", "child"]);
    assert_eq!(child.component(), "child");
}

#[test]
fn test_log_level_tags() {
    assert_eq!(LogLevel::Verbose.to_string(), "V");
    assert_eq!(LogLevel::Information.to_string(), "I");
    assert_eq!(LogLevel::Warning.to_string(), "W");
    assert_eq!(LogLevel::Error.to_string(), "E");
}

#[test]
fn test_tracing_logger_does_not_panic_without_subscriber() {
    let logger = Logger::tracing("quiet");
    logger.log("nobody is listening", LogLevel::Information);
}
