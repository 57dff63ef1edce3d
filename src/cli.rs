use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "devpulse")]
#[command(about = "Personal performance analytics from your issue tracker", version)]
#[command(after_help = "EXAMPLES:
    devpulse timing                   Find your peak working hours
    devpulse burnout                  Check your burnout risk score
    devpulse predict --days 10        Sprint completion forecast
    devpulse recommend \"who should review my PR\"
    devpulse cache clear              Drop cached analyses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Show error chains and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Recompute instead of reading cached analyses (writes still happen)
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Subject user (defaults to default_user from config)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Lookback window in days
    #[arg(long, global = true)]
    pub since_days: Option<i64>,

    /// Maximum seconds to wait for the tracker before falling back
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Peak/danger hour windows and weekday quality pattern
    #[command(after_help = "EXAMPLES:
    devpulse timing
    devpulse timing --user alice --since-days 90")]
    Timing,
    /// Concurrent-load curve and current workload status
    #[command(after_help = "EXAMPLES:
    devpulse load
    devpulse load --json")]
    Load,
    /// Per-type and per-component strengths vs the team baseline
    #[command(after_help = "EXAMPLES:
    devpulse strengths
    devpulse strengths --since-days 365")]
    Strengths,
    /// Monthly velocity/quality trends and skills evolution
    Trends,
    /// Composite burnout risk score and contributing factors
    #[command(after_help = "EXAMPLES:
    devpulse burnout
    devpulse burnout --no-cache")]
    Burnout,
    /// Collaboration chemistry per teammate
    Chemistry,
    /// Monte Carlo sprint-completion forecast
    #[command(after_help = "EXAMPLES:
    devpulse predict --days 10
    devpulse predict --days 14 --json")]
    Predict(PredictArgs),
    /// Merged, ranked recommendations for a free-text question
    #[command(after_help = "EXAMPLES:
    devpulse recommend \"what should I pick up next\"
    devpulse recommend \"is my workload ok\"")]
    Recommend {
        /// Free-text context steering the recommendation mix
        context: String,
    },
    /// Manage the analysis cache
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
    /// Interactive configuration setup
    Init,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    devpulse completions bash > ~/.bash_completion.d/devpulse
    devpulse completions zsh > ~/.zfunc/_devpulse")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PredictArgs {
    /// Working days remaining in the sprint
    #[arg(long)]
    pub days: f64,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Drop all cached analyses for the subject user
    Clear,
}
