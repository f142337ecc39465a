//! Offline wait-for walkthrough against a simulated RouterOS terminal.
//!
//! The simulated session answers `/ip neighbor print` with an empty table
//! for the first two rounds and a populated one afterwards, so the batch
//! converges on the third attempt.

use std::error::Error;

use async_trait::async_trait;
use roscmd::command::CommandDescriptor;
use roscmd::config::{MatchMode, RetryPolicy};
use roscmd::error::CommandError;
use roscmd::runner::{BatchRequest, BatchRunner};
use roscmd::terminal;
use roscmd::transport::{DeviceTransport, SessionReply, TerminalSession};

struct SimulatedRouter {
    rounds: u32,
}

#[async_trait]
impl TerminalSession for SimulatedRouter {
    async fn execute(
        &mut self,
        descriptor: &CommandDescriptor,
    ) -> Result<SessionReply, CommandError> {
        self.rounds += 1;

        let stdout = if descriptor.command == "/ip neighbor print" && self.rounds >= 3 {
            "Flags: D - dynamic\n #    INTERFACE\n 0  D ether1\n"
        } else {
            "Flags: D - dynamic\n #    INTERFACE\n"
        };

        // A real session would read until the ready prompt; show what the
        // profile recognizes.
        assert!(terminal::is_ready_prompt("[admin@MikroTik] > "));
        assert!(!terminal::has_error(stdout));

        Ok(SessionReply {
            status: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let transport = DeviceTransport::cli(Box::new(SimulatedRouter { rounds: 0 }));
    let mut runner = BatchRunner::new(transport);

    let mut request = BatchRequest::new(vec!["/ip neighbor print".into()]);
    request.wait_for = vec!["result[0] contains ether1".to_string()];
    request.retry = RetryPolicy {
        retries: 5,
        interval: 1,
        match_mode: MatchMode::All,
    };

    println!("waiting for a neighbor on ether1...");
    let report = runner.run_batch(&request).await?;

    for (index, response) in report.stdout.iter().enumerate() {
        println!("response[{index}]:");
        match response.as_str() {
            Some(text) => {
                for line in text.lines() {
                    println!("  {line}");
                }
            }
            None => println!("  {response}"),
        }
    }

    Ok(())
}
