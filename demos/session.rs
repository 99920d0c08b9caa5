//! Demonstrates a Store as a per-request context bag.
//!
//! Middleware stages drop whatever they learn into the store; handlers bind
//! the pieces they need back into local variables.
//!
//! Run with: RUST_LOG=sovran_store=debug cargo run --example session

use sovran_store::{AnyKey, AnyValue, Store, StoreError};
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Ctx {
    User,
    Roles,
    RequestId,
}

#[derive(Debug, Clone)]
struct User {
    id: u64,
    name: String,
}

fn authenticate(ctx: &mut Store) {
    ctx.add(
        AnyKey::new(Ctx::User),
        User {
            id: 7,
            name: "alice".to_string(),
        },
    )
    .add(AnyKey::new(Ctx::Roles), vec!["admin".to_string()]);
}

fn handle(ctx: &Store) -> Result<String, StoreError> {
    let mut user = User {
        id: 0,
        name: String::new(),
    };
    ctx.bind_to(&AnyKey::new(Ctx::User), Some(&mut user))?;
    let roles: Vec<String> = ctx.bind(&AnyKey::new(Ctx::Roles))?;
    let request_id = ctx.bind::<u128>(&AnyKey::new(Ctx::RequestId))?;

    Ok(format!(
        "request {} by {} (#{}) with roles {:?}",
        request_id, user.name, user.id, roles
    ))
}

fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ctx: Store = Store::new();

    // Handler runs before authentication: a missing key
    match handle(&ctx) {
        Ok(line) => println!("{}", line),
        Err(e) => println!("rejected: {}", e),
    }

    authenticate(&mut ctx);
    let mut seed = HashMap::new();
    seed.insert(AnyKey::new(Ctx::RequestId), AnyValue::new(42u128));
    ctx.append(seed);

    println!("{}", handle(&ctx)?);

    // A stage that stored the wrong type
    ctx.add(AnyKey::new(Ctx::RequestId), "42".to_string());
    if let Err(e) = handle(&ctx) {
        println!("rejected: {}", e);
    }

    // Presence of the user is a precondition from here on
    let user = ctx.must_get(&AnyKey::new(Ctx::User));
    println!("user value holds a {}", user.type_name());

    Ok(())
}
