use std::{
    collections::HashMap,
    sync::{
        mpsc::{channel, Sender},
        Mutex, MutexGuard,
    },
    thread::JoinHandle,
};

use anyhow::anyhow;

use crate::{
    log_errors::LogError,
    logger_impl::{LogMessage, Logger, APP_LOGGER_NAME, CORE_LOGGER_NAME},
    LogLevel,
};

struct LoggerThread {
    sender: Sender<LogMessage>,
    handle: JoinHandle<()>,
}

static LOGGER_THREAD: Mutex<Option<LoggerThread>> = Mutex::new(None);

fn lock_logger_thread() -> MutexGuard<'static, Option<LoggerThread>> {
    // A panic while holding the lock leaves the state usable.
    LOGGER_THREAD
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Spawns the thread that owns every logger. Loggers named `core` and `app`
/// are created with their defaults if the caller does not provide them.
pub fn logging_thread_start(loggers: Option<Vec<Logger>>) -> Result<(), LogError> {
    let mut thread = lock_logger_thread();
    if thread.is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let mut logger_map = HashMap::new();
    for logger in loggers.unwrap_or_default() {
        debug_assert!(
            !logger_map.contains_key(logger.name()),
            "Logger with name \"{}\" already exists",
            logger.name()
        );
        logger_map.insert(logger.name(), logger);
    }

    logger_map
        .entry(CORE_LOGGER_NAME)
        .or_insert_with(Logger::default_core);
    logger_map
        .entry(APP_LOGGER_NAME)
        .or_insert_with(Logger::default_app);

    let (sender, receiver) = channel::<LogMessage>();

    let handle = std::thread::spawn(move || {
        while let Ok(msg) = receiver.recv() {
            match logger_map.get(msg.logger_name) {
                Some(logger) => logger.log(msg.level, &msg.msg),
                None => eprintln!("Logger with name \"{}\" does not exist", msg.logger_name),
            }

            if msg.shutdown && msg.logger_name == CORE_LOGGER_NAME {
                break;
            }
        }
    });

    *thread = Some(LoggerThread { sender, handle });
    Ok(())
}

/// Flushes pending messages and stops the logger thread.
pub fn logging_thread_join() -> anyhow::Result<()> {
    let thread = lock_logger_thread().take().ok_or(LogError::NotRunning)?;

    let _ = thread.sender.send(LogMessage {
        logger_name: CORE_LOGGER_NAME,
        level: LogLevel::Info,
        msg: "Shutting down the logger thread".into(),
        shutdown: true,
    });

    thread
        .handle
        .join()
        .map_err(|_| anyhow!("The logger thread panicked"))
}

pub fn logging_thread_running() -> bool {
    lock_logger_thread().is_some()
}

/// Routes a message to the logger thread, or logs it on the calling thread
/// when no logger thread is running.
pub fn dispatch(msg: LogMessage) {
    let msg = {
        let thread = lock_logger_thread();
        match thread.as_ref() {
            Some(thread) => match thread.sender.send(msg) {
                Ok(()) => return,
                Err(err) => err.0,
            },
            None => msg,
        }
    };

    // Release builds without a logger thread only surface warnings and up.
    if cfg!(debug_assertions) || msg.level >= LogLevel::Warn {
        Logger::default_for(msg.logger_name).log(msg.level, &msg.msg);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // The logger thread is process wide, so its whole lifecycle is checked in
    // a single test.
    #[test]
    fn test_thread_lifecycle() -> anyhow::Result<()> {
        logging_thread_start(None)?;
        assert!(logging_thread_running());
        assert!(matches!(
            logging_thread_start(None),
            Err(LogError::AlreadyInitialized)
        ));

        crate::core_info!("logger thread test {}", 42);
        crate::warn!("app side warning");

        logging_thread_join()?;
        assert!(!logging_thread_running());

        let err = logging_thread_join().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LogError>(),
            Some(LogError::NotRunning)
        ));

        // Without the thread, messages are written synchronously.
        crate::core_debug!("logged without a thread");
        Ok(())
    }
}
