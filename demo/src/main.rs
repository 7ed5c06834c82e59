//! Reference CRM authorization demo.
//!
//! Builds the reference policy tables, evaluates one access request against
//! them, and prints the decision as JSON.
//!
//! ```text
//! demo --role rep --resource customers --action read --user 5 \
//!     --data '{"id":1,"name":"Acme","revenue":1000000}'
//! ```
//!
//! Exits 0 when the action is allowed, 2 when it is denied.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lattice_contracts::{
    principal::{Role, UserId},
    request::{AccessRequest, OwnershipScope},
    resource::{Action, Resource},
};
use lattice_ref_crm::reference_gate;

// ── CLI ───────────────────────────────────────────────────────────────────────

/// Evaluate one request against the lattice reference CRM policies.
#[derive(Parser)]
#[command(name = "demo")]
struct Cli {
    /// Acting role: admin, manager, rep, content-editor, viewer.
    #[arg(long)]
    role: Role,

    /// Target resource: customers, proposals, opportunities, knowledge-base,
    /// templates, users.
    #[arg(long)]
    resource: Resource,

    /// Requested action: create, read, update, delete, list, search, export,
    /// approve, publish, assign, manage.
    #[arg(long)]
    action: Action,

    /// Acting user id.
    #[arg(long)]
    user: String,

    /// Current resource data as JSON (an object, or an array for list).
    #[arg(long)]
    data: Option<String>,

    /// Proposed field changes as a JSON object.
    #[arg(long)]
    update: Option<String>,

    /// Enforce ownership scoping against this owner id.
    #[arg(long)]
    owner: Option<String>,
}

fn parse_json(label: &str, raw: Option<&str>) -> Option<serde_json::Value> {
    raw.map(|s| match serde_json::from_str(s) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{} is not valid JSON: {}", label, e);
            std::process::exit(1);
        }
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to watch each pipeline stage.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let resource_data = parse_json("--data", cli.data.as_deref());
    let update_data = parse_json("--update", cli.update.as_deref());

    let gate = match reference_gate() {
        Ok(gate) => gate,
        Err(e) => {
            eprintln!("failed to build reference policies: {}", e);
            std::process::exit(1);
        }
    };

    let request = AccessRequest {
        role: cli.role,
        resource: cli.resource,
        action: cli.action,
        user_id: UserId::new(cli.user),
        resource_data,
        update_data,
        ownership: cli.owner.map(|id| OwnershipScope {
            owner_id: Some(UserId::new(id)),
        }),
    };

    let decision = gate.decide(&request);

    match serde_json::to_string_pretty(&decision) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to serialize decision: {}", e);
            std::process::exit(1);
        }
    }

    if !decision.allowed {
        std::process::exit(2);
    }
}
