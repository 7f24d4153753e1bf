use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Friends, friend requests and town presence for players")]
pub struct Cli {
    /// Path to a settings file, without or with the `.toml` extension.
    #[arg(long)]
    pub settings: Option<String>,
}
