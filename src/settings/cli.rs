use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "manga-studio", about = "Manga Studio command-line client")]
pub struct Cli {
    #[arg(long, env = "STUDIO_SETTINGS")]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STUDIO_PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "STUDIO_PASSWORD")]
        password: String,
    },
    /// Sign in with a wallet or identity-provider token
    IdentityLogin {
        #[arg(long)]
        token: String,
        #[arg(long)]
        wallet: Option<String>,
    },
    Logout,
    /// Show the signed-in profile
    Whoami,
    Plans,
    TopUp {
        #[arg(long)]
        plan: String,
    },
    /// Request a generation and wait for it
    Generate {
        prompt: String,
        #[arg(long)]
        style: Option<String>,
        #[arg(long, default_value_t = 120)]
        wait_secs: u64,
        /// Submit even when a near-identical prompt was generated before
        #[arg(long)]
        force: bool,
    },
    Status {
        id: String,
    },
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Projects,
    /// Keep the session fresh until Ctrl-C or the session ends
    Watch,
}
