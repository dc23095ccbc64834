use std::path::PathBuf;

use structopt::StructOpt;

use pixmail::config;
use pixmail::sendgrid::SendGridClient;
use pixmail::upload::{self, RunOptions};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pixmail-send",
    about = "Email each file in a directory as an attachment via SendGrid."
)]
struct Opt {
    /// Directories to scan for files
    #[structopt(parse(from_os_str), default_value = "./videos/")]
    paths: Vec<PathBuf>,

    /// Also send files in subdirectories
    #[structopt(short, long)]
    recursive: bool,

    /// Optional TOML config file; environment variables take precedence
    #[structopt(short, long)]
    config: Option<String>,

    /// Subject (and body) prefix; the file index is appended
    #[structopt(short, long, default_value = "Video Upload")]
    subject: String,

    /// Stop at the first file that cannot be read
    #[structopt(long)]
    fail_fast: bool,
}

impl From<Opt> for RunOptions {
    fn from(opt: Opt) -> Self {
        RunOptions {
            paths: opt.paths,
            recursive: opt.recursive,
            subject_prefix: opt.subject,
            fail_fast: opt.fail_fast,
        }
    }
}

fn process(opt: Opt) -> Result<upload::Summary, pixmail::Error> {
    let settings = config::load_settings(opt.config.as_deref())?;
    let client = SendGridClient::new(&settings)?;

    upload::run(&client, &settings, &opt.into())
}

fn main() {
    // Init logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format_timestamp_micros()
        .init();

    let opt = Opt::from_args();

    if let Err(e) = process(opt) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
