use std::{fmt::Write as _, thread, time::Duration};

use chrono::{format::DelayedFormat, DateTime, Local};
use crossbeam_channel::{bounded, unbounded, Sender};
use once_cell::sync::Lazy;
use strum::Display;

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 單次寫入檔案前累積的最大位元組數
const BATCH_SIZE: usize = 4096;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

enum Command {
    Write(LogMessage),
    /// 寫出尚未寫入的內容後回覆
    Flush(Sender<()>),
}

pub struct Logger {
    writer: Sender<Command>,
}

impl Logger {
    /// 建立一個寫入 `log/%Y-%m-%d-{name}.log` 的記錄器
    pub fn new(log_name: &str) -> Self {
        Self::with_pattern(format!("log/%Y-%m-%d-{}.log", log_name))
    }

    /// `fn_pattern` 為 chrono 格式的檔名模式
    pub fn with_pattern(fn_pattern: String) -> Self {
        let (tx, rx) = unbounded::<Command>();
        let mut rotate = Rotate::new(fn_pattern);

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut line = String::with_capacity(BATCH_SIZE);

            for received in &rx {
                let ack = match received {
                    Command::Write(msg) => {
                        if writeln!(
                            &mut line,
                            "{} {} {}",
                            msg.created_at.format("%F %X%.6f"),
                            msg.level,
                            msg.msg
                        )
                        .is_err()
                        {
                            continue;
                        }
                        None
                    }
                    Command::Flush(ack) => Some(ack),
                };

                if ack.is_some() || rx.is_empty() || line.len() >= BATCH_SIZE {
                    if !line.is_empty() {
                        if let Err(why) = rotate.write_msg(Local::now(), line.as_bytes()) {
                            error_console(format!(
                                "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                                why, line
                            ));
                        }
                        line.clear();
                    }

                    rotate.flush();
                }

                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
        });

        Logger { writer: tx }
    }

    pub fn debug(&self, log: String) {
        self.send(Level::Debug, log);
    }

    pub fn info(&self, log: String) {
        self.send(Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(Level::Error, log);
    }

    /// 等待先前送出的訊息寫入檔案，最多等待 `timeout`
    pub fn flush(&self, timeout: Duration) -> bool {
        let (tx, rx) = bounded::<()>(1);
        if self.writer.send(Command::Flush(tx)).is_err() {
            return false;
        }

        rx.recv_timeout(timeout).is_ok()
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(Command::Write(LogMessage::new(level, msg))) {
            error_console(why.to_string());
        }
    }
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

/// 將預設記錄器中尚未寫入的訊息寫入檔案
pub fn flush_file(timeout: Duration) -> bool {
    LOGGER.flush(timeout)
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    println!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
