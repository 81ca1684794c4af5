//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `knowledge_core` linkage.
//! - Evaluate one navigation or one mock transform for quick local checks.
//! - Keep output deterministic: no network, no clock beyond the system one.

use knowledge_core::{
    ClientConfig, Credential, CredentialStore, MemoryCredentialStore, MockTransformer,
    RouteAuthorizer, RouteTable, SessionGuard, SystemClock, TransformKind,
};
use std::process::ExitCode;

const USAGE: &str = "usage:
  knowledge_cli
  knowledge_cli navigate <path> [credential]
  knowledge_cli transform <clear|grammar|concise|title|summary> <html>";

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let result = match args.first().map(String::as_str) {
        None => {
            println!("knowledge_core ping={}", knowledge_core::ping());
            println!("knowledge_core version={}", knowledge_core::core_version());
            Ok(())
        }
        Some("navigate") => navigate(&args[1..]),
        Some("transform") => transform(&args[1..]),
        Some(other) => Err(format!("unknown command `{other}`")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}\n{USAGE}");
            ExitCode::FAILURE
        }
    }
}

fn navigate(args: &[String]) -> Result<(), String> {
    let path = args.first().ok_or("missing <path>")?;
    let config = ClientConfig::default();
    let store = MemoryCredentialStore::new(SystemClock);
    if let Some(raw) = args.get(1) {
        store
            .set(Credential::new(raw.as_str()), config.credential_ttl())
            .map_err(|err| err.to_string())?;
    }

    let authorizer = RouteAuthorizer::new(SessionGuard::new(&store, SystemClock));
    let session = authorizer.guard().session();
    println!("session={session:?}");
    println!(
        "navigation={:?}",
        RouteTable::knowledge_app(&config).navigate(path, &authorizer)
    );
    Ok(())
}

fn transform(args: &[String]) -> Result<(), String> {
    let raw_kind = args.first().ok_or("missing <kind>")?;
    let kind =
        TransformKind::parse(raw_kind).ok_or_else(|| format!("unknown transform `{raw_kind}`"))?;
    let content = args.get(1).map(String::as_str).unwrap_or_default();
    println!("{}", MockTransformer::apply(kind, content));
    Ok(())
}
