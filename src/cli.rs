use std::io::{self, Write};

use clap::Parser;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use satrack::parser::{self, Command};

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the satrack server.
    #[clap(long, default_value = "http://127.0.0.1:8000")]
    host: String,
}

fn main() {
    let args = Args::parse();
    let client = Client::new();

    print_banner();

    match client.get(format!("{}/setup", args.host)).build() {
        Ok(_) => println!("[\u{2713}] Ready to talk to satrack at {}", args.host),
        Err(e) => {
            println!("[\u{2717}] Invalid host '{}': {}", args.host, e);
            return;
        }
    }
    println!("Type 'HELP' for supported commands or 'EXIT' to quit.\n");

    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print!("satrack> ");
        io::stdout().flush().unwrap();
        buffer.clear();

        if stdin.read_line(&mut buffer).unwrap() == 0 {
            break;
        }
        if buffer.trim().is_empty() {
            continue;
        }

        match parser::parse_command(&buffer) {
            Ok(cmd) => {
                if let Err(e) = execute_command(&client, &args.host, cmd) {
                    println!("[\u{26a0}\u{fe0f} Error] {}", e);
                }
            }
            Err(e) => {
                println!("[\u{2717} Syntax Error] {}", e);
                println!("    \u{2139}\u{fe0f}  Hint: LAST 'SAT-1' AT 2021-01-26T06:26:10");
            }
        }
    }
}

fn print_banner() {
    println!("\n==================================================");
    println!("   satrack CLI - Satellite Position Queries");
    println!("==================================================\n");
}

fn print_help() {
    println!("\n--- Available Commands ---");
    println!("1. SETUP:    SETUP");
    println!("             Re-seed the store from the server's dataset.");
    println!("2. LAST:     LAST 'SAT-1' AT 2021-01-26T06:26:10");
    println!("             Last known position at an exact timestamp.");
    println!("3. CLOSEST:  CLOSEST 49.5 11.2 AT 2021-01-26T06:26:10");
    println!("             Closest satellite to (lat, lon) at a timestamp.");
    println!("4. EXIT:     Quit\n");
}

fn execute_command(client: &Client, host: &str, cmd: Command) -> Result<(), String> {
    match cmd {
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Setup => perform_setup(client, host),
        Command::Last { id, at } => perform_last(client, host, &id, &at),
        Command::Closest {
            latitude,
            longitude,
            at,
        } => perform_closest(client, host, latitude, longitude, &at),
        Command::Exit => std::process::exit(0),
    }
}

// --- NETWORK HANDLERS ---

fn perform_setup(client: &Client, host: &str) -> Result<(), String> {
    let resp = client
        .get(format!("{}/setup", host))
        .send()
        .map_err(|e| e.to_string())?;

    if resp.status() == StatusCode::OK {
        let msg: String = resp.json().map_err(|e| e.to_string())?;
        println!("[\u{2713} OK] {}", msg);
        Ok(())
    } else {
        Err(format!(
            "Setup failed ({}): {}",
            resp.status(),
            resp.text().unwrap_or_default()
        ))
    }
}

fn perform_last(client: &Client, host: &str, id: &str, at: &str) -> Result<(), String> {
    let resp = client
        .get(format!("{}/sat/lastposition/{}/{}/", host, id, at))
        .send()
        .map_err(|e| e.to_string())?;

    match resp.status() {
        StatusCode::OK => {
            println!("{}", resp.text().map_err(|e| e.to_string())?);
            Ok(())
        }
        StatusCode::NOT_FOUND => {
            println!("[\u{2717}] No satellites for the given parameters.");
            Ok(())
        }
        status => Err(format!(
            "{}: {}",
            status,
            resp.text().unwrap_or_default()
        )),
    }
}

fn perform_closest(
    client: &Client,
    host: &str,
    latitude: f64,
    longitude: f64,
    at: &str,
) -> Result<(), String> {
    let resp = client
        .get(format!(
            "{}/sat/closestfrom/{}/{}/{}",
            host, at, latitude, longitude
        ))
        .send()
        .map_err(|e| e.to_string())?;

    match resp.status() {
        StatusCode::OK => {
            let body: serde_json::Value = resp.json().map_err(|e| e.to_string())?;
            let sat = body["sat"].as_str().unwrap_or("<unknown>");
            let distance = body["distance"].as_f64().unwrap_or(f64::NAN);
            println!("{}", sat);
            println!("  \u{2022} Distance: {:.4} km", distance);
            Ok(())
        }
        StatusCode::NOT_FOUND => {
            println!("[\u{2717}] No satellites recorded at {}.", at);
            Ok(())
        }
        status => Err(format!(
            "{}: {}",
            status,
            resp.text().unwrap_or_default()
        )),
    }
}
