//! Interface management CLI (netifctl)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use netifctl::commands::{
    CheckCommand, InterfaceFilter, OutputFormat, RouteCommand, RouteSpec, ShutdownCommand,
    StatusCommand, VlanCommand,
};
use netifctl::context::AppContext;

#[derive(Parser)]
#[command(name = "netifctl")]
#[command(about = "Linux network interface, VLAN and route management")]
#[command(version)]
#[command(long_about = "
Linux network interface, VLAN and route management

Queries the kernel views of network interfaces and VLANs, forces the
shutdown of a physical interface together with its VLANs, and drives the
routing table through ip(8).

Examples:
  netifctl list --physical               # Physical interfaces
  netifctl show eth0                     # Attributes of eth0
  netifctl vlan                          # Kernel VLAN table
  netifctl shutdown eth0                 # Down eth0 and eth0.* VLANs
  netifctl route add 10.0.0.0 24 192.168.1.1 eth0
  netifctl check netmask 255.255.255.0
")]
struct Cli {
    /// Configuration file (defaults to /etc/netif/netif.toml or ./netif.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'V', long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered network interfaces
    List {
        /// Physical interfaces only
        #[arg(long)]
        physical: bool,

        /// Live VLAN interfaces only
        #[arg(long)]
        vlan: bool,

        /// Ethernet interfaces only
        #[arg(long)]
        ethernet: bool,
    },

    /// Show the status of an interface
    Show {
        /// Interface name
        interface: String,
    },

    /// Show the kernel VLAN table, or the VLAN information of an interface
    Vlan {
        /// Interface name
        interface: Option<String>,
    },

    /// Force the shutdown of a physical interface and its VLANs
    Shutdown {
        /// Physical interface name
        interface: String,
    },

    /// Start the ifplugd service
    StartIfplugd,

    /// Routing table operations
    Route {
        #[command(subcommand)]
        action: RouteAction,
    },

    /// Validate and normalize values
    Check {
        #[command(subcommand)]
        kind: CheckKind,
    },
}

#[derive(Subcommand)]
enum RouteAction {
    /// List gateway routes
    List,
    /// Add a gateway route
    Add(RouteArgs),
    /// Delete a gateway route
    Del(RouteArgs),
    /// Flush the routing table
    Flush,
    /// Flush the routing cache
    FlushCache,
}

#[derive(Args)]
struct RouteArgs {
    /// Destination address
    address: String,
    /// Prefix length or netmask
    netmask: String,
    /// Gateway address
    gateway: String,
    /// Outgoing interface
    interface: String,
}

impl From<RouteArgs> for RouteSpec {
    fn from(args: RouteArgs) -> Self {
        RouteSpec {
            address: args.address,
            netmask: args.netmask,
            gateway: args.gateway,
            iface: args.interface,
        }
    }
}

#[derive(Subcommand)]
enum CheckKind {
    /// IPv4 address, in any inet_aton notation
    Ipv4 { value: String },
    /// Contiguous IPv4 netmask
    Netmask { value: String },
    /// MAC address
    Mac { value: String },
    /// DNS search domain
    Domain { value: String },
}

fn run(cli: Cli) -> Result<String> {
    let format = OutputFormat::from_json_flag(cli.json);
    let context = || AppContext::bootstrap(cli.config.as_deref());

    match cli.command {
        Commands::List {
            physical,
            vlan,
            ethernet,
        } => {
            let filter = InterfaceFilter {
                physical,
                vlan,
                ethernet,
            };
            StatusCommand::new(context()?).list(filter, format)
        }

        Commands::Show { interface } => StatusCommand::new(context()?).show(&interface, format),

        Commands::Vlan { interface } => {
            VlanCommand::new(context()?).execute(interface.as_deref(), format)
        }

        Commands::Shutdown { interface } => ShutdownCommand::new(context()?).execute(&interface),

        Commands::StartIfplugd => ShutdownCommand::new(context()?).start_ifplugd(),

        Commands::Route { action } => {
            let cmd = RouteCommand::new(context()?);
            match action {
                RouteAction::List => cmd.list(format),
                RouteAction::Add(args) => cmd.add(&args.into()),
                RouteAction::Del(args) => cmd.del(&args.into()),
                RouteAction::Flush => cmd.flush(),
                RouteAction::FlushCache => cmd.flush_cache(),
            }
        }

        // No configuration needed
        Commands::Check { kind } => {
            let cmd = CheckCommand::new(format);
            match kind {
                CheckKind::Ipv4 { value } => cmd.ipv4(&value),
                CheckKind::Netmask { value } => cmd.netmask(&value),
                CheckKind::Mac { value } => cmd.mac(&value),
                CheckKind::Domain { value } => cmd.domain(&value),
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let quiet = cli.quiet;
    let show_chain = cli.verbose || cli.debug;

    // Handle errors with appropriate exit codes
    match run(cli) {
        Ok(output) => {
            if !quiet && !output.is_empty() {
                println!("{}", output);
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);

            // Print error chain if in verbose mode
            if show_chain {
                for cause in e.chain().skip(1) {
                    eprintln!("  Caused by: {}", cause);
                }
            }
            std::process::exit(1);
        }
    }
}
