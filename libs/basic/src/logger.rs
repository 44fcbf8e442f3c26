// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! Loggers behind the `log` facade: console, syslog (/dev/log) and a
//! size-rotated file.
//!
//! A daemonized process has its standard descriptors bound to /dev/null, so
//! it should log to `syslog` or `file`. Initialize the logger only after
//! daemonizing, the daemonizer closes every open descriptor.
use crate::Error;
use log::{LevelFilter, Log};
use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    os::unix::{
        net::UnixDatagram,
        prelude::{OpenOptionsExt, PermissionsExt},
    },
    path::{Path, PathBuf},
    sync::Mutex,
};

/// syslog facility LOG_DAEMON
const LOG_DAEMON: u8 = 3 << 3;

fn write_msg_common(writer: &mut impl Write, module: &str, msg: String) {
    let now_str = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S ")
        .to_string();

    /* 1. Write time */
    if let Err(e) = writer.write(now_str.as_bytes()) {
        println!("Failed to log time message: {}", e);
        return;
    }

    /* 2. Write module */
    if let Err(e) = writer.write((module.to_string() + " ").as_bytes()) {
        println!("Failed to log module message: {}", e);
        return;
    }

    /* 3. Write message */
    if let Err(e) = writer.write((msg + "\n").as_bytes()) {
        println!("Failed to log message: {}", e);
    }
}

/// syslog severity of a log level
fn syslog_severity(level: log::Level) -> u8 {
    match level {
        log::Level::Error => 3,
        log::Level::Warn => 4,
        log::Level::Info => 6,
        log::Level::Debug | log::Level::Trace => 7,
    }
}

struct SysLogger {
    ident: String,
    pid: u32,
    dgram: Mutex<UnixDatagram>,
}

impl SysLogger {
    fn connect(ident: &str) -> Result<Self, std::io::Error> {
        let sock = UnixDatagram::unbound()?;
        sock.connect("/dev/log")?;
        Ok(Self {
            ident: ident.to_string(),
            pid: std::process::id(),
            dgram: Mutex::new(sock),
        })
    }

    fn format(&self, record: &log::Record) -> String {
        format!(
            "<{}>{}[{}]: {} {}",
            LOG_DAEMON | syslog_severity(record.level()),
            self.ident,
            self.pid,
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    }
}

/* This is an extremely simple implementation, and only
 * supports the very basic log function. */
impl log::Log for SysLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let msg = self.format(record);

        let dgram = match self.dgram.lock() {
            Err(_) => return,
            Ok(v) => v,
        };

        if let Err(e) = dgram.send(msg.as_bytes()) {
            eprintln!("Failed to log message: {}", e);
        }
    }

    fn flush(&self) {}
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        /* diagnostics go to stderr, stdout belongs to the program's output */
        let mut stderr = std::io::stderr();
        let module_path = match record.module_path() {
            None => "unknown",
            Some(v) => v,
        };
        write_msg_common(&mut stderr, module_path, record.args().to_string());
    }

    fn flush(&self) {}
}

struct FileLogger {
    level: log::Level,
    file_path: PathBuf,
    file_number: u32,
    max_size: u64,
    file: Mutex<File>,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut file = match self.file.lock() {
            Err(_) => return,
            Ok(v) => v,
        };

        let module_path = match record.module_path() {
            None => "unknown",
            Some(v) => v,
        };
        write_msg_common(&mut *file, module_path, record.args().to_string());

        let current_size = match file.metadata() {
            Err(_) => return,
            Ok(v) => v.len(),
        };
        if current_size <= self.max_size {
            return;
        }

        if let Err(e) = self.rotate() {
            eprintln!("Failed to rotate log file: {}", e);
        }
        if let Err(e) = file.set_len(0) {
            eprintln!("Failed to clear log file: {}", e);
        }
    }

    fn flush(&self) {
        let mut file = match self.file.lock() {
            Err(_) => return,
            Ok(v) => v,
        };
        if let Err(e) = file.flush() {
            eprintln!("Failed to flush log file: {}", e);
        }
    }
}

impl FileLogger {
    fn file_open(file_path: &Path, file_mode: u32) -> Result<File, Error> {
        let dir = file_path.parent().ok_or(Error::Invalid {
            what: format!("log file path {}", file_path.display()),
        })?;
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .mode(file_mode)
            .open(file_path)?;
        Ok(file)
    }

    /// max_size is in KiB
    fn new(
        level: log::Level,
        file_path: PathBuf,
        file_mode: u32,
        max_size: u32,
        file_number: u32,
    ) -> Result<Self, Error> {
        let file = Self::file_open(&file_path, file_mode)?;
        Ok(Self {
            level,
            file_path,
            file_number,
            max_size: u64::from(max_size) * 1024,
            file: Mutex::new(file),
        })
    }

    /// Shift `name.1 .. name.N` up by one, drop the surplus and copy the
    /// active file to `name.1`. At most `file_number` rotated files remain.
    fn rotate(&self) -> Result<(), Error> {
        let dir = self.file_path.parent().ok_or(Error::Other {
            msg: "Cannot determine the parent directory of log file".to_string(),
        })?;
        let file_name = match self.file_path.file_name() {
            None => {
                return Err(Error::Other {
                    msg: "Cannot determine the file name of log file".to_string(),
                })
            }
            Some(v) => v.to_string_lossy().to_string(),
        };
        let file_name_dot = file_name.clone() + ".";

        /* Walk through the parent directory, save the suffix rotate number in num_list */
        let mut num_list: Vec<usize> = Vec::new();
        for de in dir.read_dir()? {
            let de = match de {
                Err(_) => continue,
                Ok(v) => v,
            };
            match de.file_type() {
                Ok(t) if t.is_file() => {}
                _ => continue,
            }

            let de_file_name = de.file_name().to_string_lossy().to_string();
            if let Some(num) = de_file_name
                .strip_prefix(&file_name_dot)
                .and_then(|n| n.parse::<usize>().ok())
            {
                num_list.push(num);
            }
        }

        num_list.sort_unstable();

        /* 1. delete surplus rotated files, one slot is kept for the new copy */
        while num_list.len() >= self.file_number as usize {
            let num = match num_list.pop() {
                None => break,
                Some(v) => v,
            };
            let src = dir.join(format!("{}{}", file_name_dot, num));
            if let Err(e) = fs::remove_file(src) {
                eprintln!("Failed to remove old log file: {}", e);
            }
        }

        /* 2. {name.1, name.2, ...} => {name.2, name.3, ...} */
        while let Some(num) = num_list.pop() {
            let src = dir.join(format!("{}{}", file_name_dot, num));
            let dst = dir.join(format!("{}{}", file_name_dot, num + 1));
            if let Err(e) = fs::rename(src, dst) {
                eprintln!("Failed to rotate log file: {}", e);
            }
        }

        /* 3. **copy** name => name.1 */
        let dst = dir.join(format!("{}1", file_name_dot));
        fs::copy(&self.file_path, &dst)?;
        fs::set_permissions(dst, fs::Permissions::from_mode(0o400))?;
        Ok(())
    }
}

struct CombinedLogger {
    loggers: Vec<Box<dyn log::Log>>,
}

impl log::Log for CombinedLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        for logger in &self.loggers {
            logger.log(record);
        }
    }

    fn flush(&self) {
        for logger in &self.loggers {
            logger.flush();
        }
    }
}

impl CombinedLogger {
    fn empty() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    fn push(&mut self, logger: Box<dyn Log>) {
        self.loggers.push(logger)
    }
}

/// Translate a configured level name, unknown names turn logging off.
pub fn parse_level(level: &str) -> LevelFilter {
    match level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Off,
    }
}

/// Init and set the log target to console
///
/// [`app_name`]: which app output the log
///
/// level: maximum log level
pub fn init_log_to_console(app_name: &str, level: LevelFilter) {
    init_log(app_name, level, "console", "", 0, 0);
}

/// Init and set the logger
///
/// [`app_name`]: which app output the log, used as the syslog identifier
///
/// level:  maximum log level
///
/// target: `console`, `syslog`, `console-syslog` or `file`
///
/// file_path: the active log file (valid when target == "file")
///
/// file_size: the maximum size in KiB of an active log file (valid when target == "file")
///
/// file_number: the maximum number of rotated log files (valid when target == "file")
pub fn init_log(
    app_name: &str,
    level: LevelFilter,
    target: &str,
    file_path: &str,
    file_size: u32,
    file_number: u32,
) {
    let mut target = target;
    if target == "file" && (file_size == 0 || file_number == 0 || file_path.is_empty()) {
        eprintln!(
            "LogTarget is configured to `file`, but configuration is invalid, changing the \
             LogTarget to `syslog`, file_path: '{}', file_size: {}, file_number: {}",
            file_path, file_size, file_number
        );
        target = "syslog";
    }

    let mut logger = CombinedLogger::empty();
    match target {
        "console" => logger.push(Box::new(ConsoleLogger)),
        "syslog" | "console-syslog" => {
            if target == "console-syslog" {
                logger.push(Box::new(ConsoleLogger));
            }
            match SysLogger::connect(app_name) {
                Ok(l) => logger.push(Box::new(l)),
                Err(e) => eprintln!("Failed to connect to /dev/log: {}", e),
            }
        }
        "file" => match FileLogger::new(
            log::Level::Trace,
            PathBuf::from(file_path),
            0o600,
            file_size,
            file_number,
        ) {
            Ok(l) => logger.push(Box::new(l)),
            Err(e) => eprintln!("Failed to open log file {}: {}", file_path, e),
        },
        _ => eprintln!("Unsupported log target '{}', logging disabled", target),
    }

    if let Err(e) = log::set_boxed_logger(Box::new(logger)) {
        eprintln!("Failed to set logger: {:?}", e);
    }
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(msg: &str) {
        log::info!("{}", msg);
    }

    fn log_to(logger: &dyn Log, level: log::Level, msg: &str) {
        logger.log(
            &log::Record::builder()
                .args(format_args!("{}", msg))
                .level(level)
                .module_path(Some("basic::logger::tests"))
                .build(),
        );
    }

    #[test]
    fn test_init_log_to_console() {
        init_log_to_console("test", LevelFilter::Debug);
        record("test for logger info");
        log::error!("test for logger error");
        log::warn!("test for logger warn");
        log::debug!("test for logger debug");
        log::trace!("test for logger trace");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("verbose"), LevelFilter::Off);
    }

    #[test]
    fn test_file_logger_rotate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log").join("ucased.log");
        /* 1 KiB limit, keep 2 rotated files */
        let logger = FileLogger::new(log::Level::Info, path.clone(), 0o600, 1, 2).unwrap();
        assert!(path.exists());

        log_to(&logger, log::Level::Debug, "filtered out");
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        let line = "x".repeat(300);
        for _ in 0..20 {
            log_to(&logger, log::Level::Info, &line);
        }
        logger.flush();

        let rotated_1 = dir.path().join("log").join("ucased.log.1");
        let rotated_2 = dir.path().join("log").join("ucased.log.2");
        let rotated_3 = dir.path().join("log").join("ucased.log.3");
        assert!(rotated_1.exists());
        assert!(rotated_2.exists());
        assert!(!rotated_3.exists());
        assert!(fs::metadata(&path).unwrap().len() <= 1024);

        let content = fs::read_to_string(rotated_1).unwrap();
        assert!(content.contains("basic::logger::tests"));
    }

    #[test]
    fn test_syslog_format() {
        let (a, _b) = UnixDatagram::pair().unwrap();
        let logger = SysLogger {
            ident: "ucased".to_string(),
            pid: 42,
            dgram: Mutex::new(a),
        };
        let msg = logger.format(
            &log::Record::builder()
                .args(format_args!("ready"))
                .level(log::Level::Warn)
                .module_path(Some("ucased"))
                .build(),
        );
        assert_eq!(msg, "<28>ucased[42]: ucased ready");
    }
}
