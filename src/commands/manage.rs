//! `manage`: interactive menu to view, search, add, edit or delete ATMs. Every change
//! is written back to the list file straight away.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::CommandResult;
use crate::connectivity::Endpoint;
use crate::machines::{is_valid_ipv4, load_machines, save_machines};

#[derive(Debug, Clone)]
pub struct ManageConfig {
    pub machines_path: PathBuf,
}

enum Flow {
    Continue,
    Exit,
}

pub fn run(config: ManageConfig) -> CommandResult {
    let stdin = io::stdin();
    let mut manager = Manager::new(config, stdin.lock(), io::stdout());
    manager.run()
}

/// Indices of ATMs whose name contains `query`, ignoring case
fn matching_indices(machines: &[Endpoint], query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    machines
        .iter()
        .enumerate()
        .filter(|(_, m)| m.name.to_lowercase().contains(&query))
        .map(|(i, _)| i)
        .collect()
}

pub struct Manager<R, W> {
    config: ManageConfig,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Manager<R, W> {
    pub fn new(config: ManageConfig, input: R, out: W) -> Self {
        Self { config, input, out }
    }

    /// Read one trimmed line; `None` once input is exhausted.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        self.read_line()
    }

    pub fn run(&mut self) -> CommandResult {
        loop {
            let machines = load_machines(&self.config.machines_path)?;

            writeln!(self.out, "\n🔧 ATM Manager")?;
            writeln!(self.out, "1. View all ATMs")?;
            writeln!(self.out, "2. Search ATM by name")?;
            writeln!(self.out, "3. Add new ATM")?;
            writeln!(self.out, "4. Edit ATM IP")?;
            writeln!(self.out, "5. Delete ATM")?;
            writeln!(self.out, "6. Exit")?;

            let Some(choice) = self.prompt("👉 Select an option (1-6): ")? else {
                break;
            };
            writeln!(self.out)?;

            let flow = match choice.as_str() {
                "1" => self.view(&machines)?,
                "2" => self.search(&machines)?,
                "3" => self.add(machines)?,
                "4" => self.edit(machines)?,
                "5" => self.delete(machines)?,
                "6" => {
                    writeln!(self.out, "👋 Exiting ATM Manager.")?;
                    break;
                }
                _ => {
                    writeln!(self.out, "❌ Invalid option")?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                break;
            }

            if self
                .prompt("\n🔁 Press Enter to return to the menu...")?
                .is_none()
            {
                break;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn list(&mut self, machines: &[Endpoint], indices: &[usize]) -> io::Result<()> {
        for (n, &i) in indices.iter().enumerate() {
            let m = &machines[i];
            writeln!(self.out, "{}. {} ({})", n + 1, m.name, m.address)?;
        }
        Ok(())
    }

    fn view(&mut self, machines: &[Endpoint]) -> io::Result<Flow> {
        writeln!(self.out, "📄 Total ATMs: {}", machines.len())?;
        let all: Vec<usize> = (0..machines.len()).collect();
        self.list(machines, &all)?;
        Ok(Flow::Continue)
    }

    /// Ask for a name fragment and show the matches. `None` when input ran out or
    /// nothing matched.
    fn find(&mut self, machines: &[Endpoint], prompt: &str) -> io::Result<Option<Vec<usize>>> {
        let Some(query) = self.prompt(prompt)? else {
            return Ok(None);
        };
        let matches = matching_indices(machines, &query);
        if matches.is_empty() {
            writeln!(self.out, "❌ No matching ATMs found")?;
            return Ok(Some(matches));
        }
        writeln!(self.out, "🔎 Matching ATMs:")?;
        self.list(machines, &matches)?;
        Ok(Some(matches))
    }

    fn search(&mut self, machines: &[Endpoint]) -> io::Result<Flow> {
        match self.find(machines, "🔍 Enter part of the ATM name: ")? {
            Some(_) => Ok(Flow::Continue),
            None => Ok(Flow::Exit),
        }
    }

    /// Pick one of the listed matches by its 1-based number, or `q` to cancel.
    fn select(&mut self, matches: &[usize], action: &str) -> io::Result<Option<usize>> {
        loop {
            let prompt = format!("➡️ Select number to {} (or 'q' to cancel): ", action);
            let Some(input) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            if input == "q" {
                writeln!(self.out, "🚫 Cancelled")?;
                return Ok(None);
            }
            match input.parse::<usize>() {
                Ok(n) if n > 0 && n <= matches.len() => return Ok(Some(matches[n - 1])),
                _ => writeln!(self.out, "❌ Invalid selection.")?,
            }
        }
    }

    /// Keep asking until a valid dotted quad is entered.
    fn read_ip(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            let Some(ip) = self.prompt(prompt)? else {
                return Ok(None);
            };
            if is_valid_ipv4(&ip) {
                return Ok(Some(ip));
            }
            writeln!(self.out, "❌ Invalid IP format. Try again.")?;
        }
    }

    fn persist(&mut self, machines: &[Endpoint], success: &str, failure: &str) -> io::Result<()> {
        match save_machines(machines, &self.config.machines_path) {
            Ok(()) => writeln!(self.out, "✅ {}", success),
            Err(e) => writeln!(self.out, "❌ {}: {}", failure, e),
        }
    }

    fn add(&mut self, mut machines: Vec<Endpoint>) -> io::Result<Flow> {
        let Some(name) = self.prompt("➕ Enter ATM name: ")? else {
            return Ok(Flow::Exit);
        };
        if name.is_empty() {
            writeln!(self.out, "❌ ATM name cannot be empty")?;
            return Ok(Flow::Continue);
        }
        if machines.iter().any(|m| m.name.eq_ignore_ascii_case(&name)) {
            writeln!(self.out, "❌ ATM already exists")?;
            return Ok(Flow::Continue);
        }

        let Some(ip) = self.read_ip("🔌 Enter ATM IP address: ")? else {
            return Ok(Flow::Exit);
        };
        machines.push(Endpoint::new(name, ip));
        self.persist(&machines, "ATM added", "Failed to add ATM")?;
        Ok(Flow::Continue)
    }

    fn edit(&mut self, mut machines: Vec<Endpoint>) -> io::Result<Flow> {
        let Some(matches) = self.find(&machines, "✏️ Enter part of ATM name to edit: ")? else {
            return Ok(Flow::Exit);
        };
        if matches.is_empty() {
            return Ok(Flow::Continue);
        }
        let Some(selected) = self.select(&matches, "edit")? else {
            return Ok(Flow::Continue);
        };

        writeln!(self.out, "✏️ Current IP: {}", machines[selected].address)?;
        let Some(ip) = self.read_ip("🔄 Enter new IP address: ")? else {
            return Ok(Flow::Exit);
        };
        machines[selected].address = ip;
        self.persist(&machines, "ATM updated", "Failed to save changes")?;
        Ok(Flow::Continue)
    }

    fn delete(&mut self, mut machines: Vec<Endpoint>) -> io::Result<Flow> {
        let Some(matches) = self.find(&machines, "🗑️ Enter part of ATM name to delete: ")?
        else {
            return Ok(Flow::Exit);
        };
        if matches.is_empty() {
            return Ok(Flow::Continue);
        }
        let Some(selected) = self.select(&matches, "delete")? else {
            return Ok(Flow::Continue);
        };

        let prompt = format!("❓ Confirm delete '{}' (y/N): ", machines[selected].name);
        let confirm = self.prompt(&prompt)?.unwrap_or_default().to_lowercase();
        if confirm != "y" && confirm != "yes" {
            writeln!(self.out, "🚫 Cancelled")?;
            return Ok(Flow::Continue);
        }

        machines.remove(selected);
        self.persist(&machines, "ATM deleted", "Failed to delete ATM")?;
        Ok(Flow::Continue)
    }
}
