use console::{style, Term};

use crate::core::error::{SetupError, SetupResult};

/// Invalid answers tolerated before a question gives up.
const MAX_ATTEMPTS: usize = 5;

/// Line-based prompts on stdout.
///
/// Questions fail instead of blocking when stdout is not a terminal, naming
/// the flag that answers them.
pub struct Prompt {
    term: Term,
    interactive: bool,
}

impl Prompt {
    pub fn new() -> Self {
        let term = Term::stdout();
        let interactive = term.is_term();
        Self { term, interactive }
    }

    #[cfg(test)]
    fn detached() -> Self {
        Self {
            term: Term::stdout(),
            interactive: false,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn say(&self, line: &str) -> SetupResult<()> {
        self.term.write_line(line)?;
        Ok(())
    }

    pub fn chose(&self, choice: &str) -> SetupResult<()> {
        self.say(&format!("You chose: {}", style(choice).cyan()))
    }

    fn require_terminal(&self, question: &str, flag: &str) -> SetupResult<()> {
        if self.interactive {
            return Ok(());
        }
        Err(SetupError::Other(format!(
            "\"{question}\" requires an interactive terminal; pass --{flag}"
        )))
    }

    fn gave_up(question: &str, flag: &str) -> SetupError {
        SetupError::Other(format!(
            "No valid answer to \"{question}\" after {MAX_ATTEMPTS} attempts; pass --{flag}"
        ))
    }

    pub fn input(&self, question: &str, flag: &str) -> SetupResult<String> {
        self.require_terminal(question, flag)?;
        self.term.write_line(&format!("{} {}", style("?").green(), question))?;
        self.term.write_str("> ")?;
        Ok(self.term.read_line()?.trim().to_string())
    }

    /// Numbered menu. Without options any non-empty answer is accepted.
    pub fn select(&self, question: &str, options: &[String], flag: &str) -> SetupResult<String> {
        self.require_terminal(question, flag)?;
        for _ in 0..MAX_ATTEMPTS {
            self.term.write_line(&format!("{} {}", style("?").green(), question))?;
            for (index, option) in options.iter().enumerate() {
                self.term.write_line(&format!("  {:>3}) {}", index + 1, option))?;
            }
            self.term.write_str("> ")?;
            let answer = self.term.read_line()?;
            if let Some(choice) = parse_selection(&answer, options) {
                return Ok(choice);
            }
            self.say(&style("Invalid choice, try again.").red().to_string())?;
        }
        Err(Self::gave_up(question, flag))
    }

    pub fn confirm(&self, question: &str, flag: &str) -> SetupResult<bool> {
        self.require_terminal(question, flag)?;
        for _ in 0..MAX_ATTEMPTS {
            self.term.write_str(&format!("{} {} [y/n] ", style("?").green(), question))?;
            let answer = self.term.read_line()?;
            if let Some(yes) = parse_confirmation(&answer) {
                return Ok(yes);
            }
        }
        Err(Self::gave_up(question, flag))
    }
}

pub fn parse_selection(answer: &str, options: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    if options.is_empty() {
        return Some(answer.to_string());
    }
    if let Ok(index) = answer.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return Some(options[index - 1].clone());
        }
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(answer))
        .cloned()
}

pub fn parse_confirmation(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}
