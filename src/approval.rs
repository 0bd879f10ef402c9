// src/approval.rs
//! Human review checkpoint for tailored content

use anyhow::{Context, Result};
use std::io::Write;

use crate::types::ApprovalDecision;

/// What the reviewer sees before deciding.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub role: String,
    pub company: String,
    pub score: u8,
    pub summary: String,
    pub tailoring_notes: String,
}

/// A blocking suspension point: the pipeline halts until the reviewer
/// produces a decision. Implementations may bridge to any calling context.
pub trait ApprovalGate: Send {
    fn review(&mut self, request: &ReviewRequest) -> Result<ApprovalDecision>;
}

/// Console gate: presents the review on stdout and reads the decision from
/// stdin. No timeout is applied.
pub struct ConsoleGate;

impl ApprovalGate for ConsoleGate {
    fn review(&mut self, request: &ReviewRequest) -> Result<ApprovalDecision> {
        println!("\n==================== RESUME REVIEW ====================");
        println!("Role:      {}", request.role);
        println!("Company:   {}", request.company);
        println!("Score:     {}/100", request.score);
        println!("\nTailored Summary:\n{}", request.summary);
        if !request.tailoring_notes.is_empty() {
            println!("\nChanges Made:\n{}", request.tailoring_notes);
        }
        println!("=======================================================");
        println!("  [y] Approve and continue");
        println!("  [n] Reject and revise");
        println!("  [e] Edit with feedback");
        println!("  [q] Quit/Cancel");
        print!("\n  Your choice > ");
        std::io::stdout()
            .flush()
            .context("Failed to flush stdout")?;

        let choice = read_line()?;
        match choice.trim().to_lowercase().as_str() {
            "y" => {
                println!("  Resume approved.");
                Ok(ApprovalDecision::approve())
            }
            "n" => Ok(ApprovalDecision::reject()),
            "e" => {
                print!("  Enter your feedback > ");
                std::io::stdout()
                    .flush()
                    .context("Failed to flush stdout")?;
                let feedback = read_line()?;
                Ok(ApprovalDecision::edit(feedback.trim()))
            }
            _ => {
                println!("  Resume generation cancelled.");
                Ok(ApprovalDecision::cancel())
            }
        }
    }
}

fn read_line() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .context("Failed to read approval input")?;
    Ok(buffer)
}
