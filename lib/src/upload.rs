use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::email::{Attachment, Email};
use crate::files;
use crate::mailer::Mailer;
use crate::Error;

pub const DEFAULT_PATH: &str = "./videos/";
pub const DEFAULT_SUBJECT_PREFIX: &str = "Video Upload";

/// Result of one send attempt
#[derive(Debug)]
pub enum Outcome {
    /// Accepted by the delivery API with this HTTP status
    Sent { status: u16 },

    /// Rejected by the delivery API, or never reached it
    Failed(Error),

    /// The attachment could not be read
    Unreadable(Error),
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(*self, Outcome::Sent { .. })
    }
}

#[derive(Debug)]
pub struct Entry {
    pub index: usize,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Per-file outcomes of a run, in send order
#[derive(Debug, Default)]
pub struct Summary {
    pub entries: Vec<Entry>,
}

impl Summary {
    pub fn sent(&self) -> usize {
        self.count(|o| o.is_sent())
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(*o, Outcome::Failed(_)))
    }

    pub fn unreadable(&self) -> usize {
        self.count(|o| matches!(*o, Outcome::Unreadable(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn count<F: Fn(&Outcome) -> bool>(&self, f: F) -> usize {
        self.entries.iter().filter(|e| f(&e.outcome)).count()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} sent, {} failed, {} unreadable",
            self.sent(),
            self.failed(),
            self.unreadable()
        )
    }
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
    pub subject_prefix: String,

    /// Abort the run on the first unreadable attachment
    pub fail_fast: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(DEFAULT_PATH)],
            recursive: false,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            fail_fast: false,
        }
    }
}

/// Send one email with a single file attached.
///
/// An unreadable attachment is returned as `Err`. Delivery failures are
/// logged and come back as `Ok(Outcome::Failed(_))`; they are never retried.
pub fn send_message<M: Mailer>(
    mailer: &M,
    settings: &Settings,
    subject: &str,
    content: &str,
    attachment: &Path,
) -> Result<Outcome, Error> {
    let attachment = Attachment::from_path(attachment)?;
    let email = Email::new(settings, subject, content, attachment);

    match mailer.send(&email) {
        Ok(status) => {
            log::info!("Sent '{}': {}", email.attachment.name, status);
            Ok(Outcome::Sent { status })
        }
        Err(e) if e.is_delivery() => {
            log::error!("Failed to send '{}': {}", email.attachment.name, e);
            Ok(Outcome::Failed(e))
        }
        Err(e) => Err(e),
    }
}

/// Email every file found under `options.paths`, one at a time, in
/// enumeration order.
pub fn run<M: Mailer>(
    mailer: &M,
    settings: &Settings,
    options: &RunOptions,
) -> Result<Summary, Error> {
    let filelist = files::enumerate_files(&options.paths, options.recursive);

    if filelist.is_empty() {
        log::info!("No files to send");
        return Ok(Summary::default());
    }

    send_all(mailer, settings, filelist, options)
}

/// Send each of `filelist` in order. Only `options.subject_prefix` and
/// `options.fail_fast` are used.
///
/// Unreadable files are recorded and skipped unless `fail_fast` is set.
/// Any other non-delivery error aborts the run.
pub fn send_all<M: Mailer>(
    mailer: &M,
    settings: &Settings,
    filelist: Vec<PathBuf>,
    options: &RunOptions,
) -> Result<Summary, Error> {
    let mut summary = Summary::default();

    for (index, path) in filelist.into_iter().enumerate() {
        log::info!("Sending video {}: {}", index, path.display());

        let subject = format!("{} {}", options.subject_prefix, index);

        let outcome = match send_message(mailer, settings, &subject, &subject, &path) {
            Ok(outcome) => outcome,
            Err(e @ Error::Io { .. }) if !options.fail_fast => {
                log::error!("Skipping unreadable file: {}", e);
                Outcome::Unreadable(e)
            }
            Err(e) => {
                log::error!("Aborting run at file {}: {}", index, e);
                return Err(e);
            }
        };

        summary.entries.push(Entry {
            index,
            path,
            outcome,
        });
    }

    log::info!("{}", summary);

    Ok(summary)
}
