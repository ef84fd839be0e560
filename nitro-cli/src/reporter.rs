//! Terminal rendering of reconcile progress.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use nitro_reconcile::Reporter;

/// Prints `  checking x … done` style lines to stdout.
#[derive(Debug, Default)]
pub struct TerminalReporter {
    line_open: AtomicBool,
}

impl TerminalReporter {
    /// Terminate a pending line with `tail`, if one is open.
    fn close(&self, tail: &str) {
        if self.line_open.swap(false, Ordering::SeqCst) {
            println!("{tail}");
        }
    }
}

impl Reporter for TerminalReporter {
    fn info(&self, message: &str) {
        self.close("");
        println!("{}", message.bold());
    }

    fn pending(&self, message: &str) {
        self.close("");
        print!("  {message} … ");
        let _ = std::io::stdout().flush();
        self.line_open.store(true, Ordering::SeqCst);
    }

    fn done(&self) {
        self.close(&"done".green().to_string());
    }

    fn warning(&self, message: &str) {
        self.close(&"failed".yellow().to_string());
        println!("  {} {message}", "!".yellow().bold());
    }

    fn success(&self, message: &str) {
        self.close("");
        println!("{} {message}", "✓".green().bold());
    }
}
