//! Command implementations.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Subcommand;

use corelib::{Fault, ServiceTable, Value};
use transport::{Client, ClientOptions, Server};

/// Result alias used by command handlers.
pub type CommandResult = anyhow::Result<()>;

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Host the demo calculator service.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:4433")]
        listen: SocketAddr,
    },
    /// Call one method on a remote server and print the result.
    Call {
        /// Server address.
        #[arg(long, default_value = "127.0.0.1:4433")]
        connect: SocketAddr,
        /// Qualified method, e.g. Calculator.Add.
        method: String,
        /// Arguments, parsed as int, float, bool, or string.
        args: Vec<String>,
    },
    /// Run a server and client in-process and exercise the calculator.
    Demo,
}

impl Command {
    pub async fn run(self) -> CommandResult {
        match self {
            Command::Serve { listen } => serve(listen).await,
            Command::Call {
                connect,
                method,
                args,
            } => call(connect, method, args).await,
            Command::Demo => demo().await,
        }
    }
}

/// The demo arithmetic service.
fn calculator() -> ServiceTable {
    ServiceTable::new()
        .method("Add", |a: i64, b: i64| a + b)
        .method("Subtract", |a: i64, b: i64| a - b)
        .method("Multiply", |a: i64, b: i64| a * b)
        .method("Divide", |a: i64, b: i64| {
            if b == 0 {
                return Err(Fault::invocation("division by zero"));
            }
            Ok(a as f64 / b as f64)
        })
}

async fn serve(listen: SocketAddr) -> CommandResult {
    let server = Server::new();
    server.register("Calculator", Arc::new(calculator()));
    let listener = server.bind(listen)?;
    println!("serving Calculator on {}", listener.local_addr());
    listener.run().await?;
    Ok(())
}

async fn call(connect: SocketAddr, method: String, args: Vec<String>) -> CommandResult {
    let client = Client::connect(connect, ClientOptions::default()).await?;
    let args: Vec<Value> = args.iter().map(|raw| parse_value(raw)).collect();

    let value = client.call(method, args).await?;
    println!("{}", value);

    client.close();
    client.wait_idle().await;
    Ok(())
}

async fn demo() -> CommandResult {
    let server = Server::new();
    server.register("Calculator", Arc::new(calculator()));
    let listener = server.bind("127.0.0.1:0".parse()?)?;
    let addr = listener.local_addr();
    tokio::spawn(listener.run());

    let client = Client::connect(addr, ClientOptions::default()).await?;
    for (method, a, b) in [
        ("Calculator.Add", 10i64, 20i64),
        ("Calculator.Subtract", 5, 9),
        ("Calculator.Multiply", 6, 7),
        ("Calculator.Divide", 84, 2),
    ] {
        let value = client.call(method, (a, b)).await?;
        println!("{}({}, {}) = {}", method, a, b, value);
    }

    match client.call("Calculator.Divide", (1i64, 0i64)).await {
        Err(err) => println!("Calculator.Divide(1, 0) failed: {}", err),
        Ok(value) => println!("Calculator.Divide(1, 0) = {}", value),
    }

    client.close();
    client.wait_idle().await;
    Ok(())
}

/// Interpret a CLI literal: int first, then float, then bool, else string.
fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return Value::Float(x);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(raw.to_string()),
    }
}
