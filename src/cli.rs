use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "JioNet-AutoConnect")]
#[command(author = "Anya")]
#[command(version = "1.0.0")]
#[command(about = "Automated three-step authenticator for the JioNet captive portal.", long_about = None)]
pub struct Args {
    /// Portal authentication endpoint (default: the live JioNet portal).
    #[arg(short, long)]
    pub url: Option<String>,

    /// JioNet identifier. Falls back to the JIO_ID environment variable.
    #[arg(long)]
    pub jio_id: Option<String>,

    /// JioNet password. Falls back to the PASSWORD environment variable.
    #[arg(long)]
    pub password: Option<String>,

    /// Account identifier to connect. Falls back to the ACCOUNT environment variable.
    #[arg(long)]
    pub account: Option<String>,

    /// Override the session cookie string sent with every request.
    #[arg(long)]
    pub cookie: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Save the final connect response to a JSON file.
    #[arg(long)]
    pub output: Option<String>,
}
