//! Interactive menu for deploying and inspecting the network

use anyhow::Result;
use std::fmt;

use super::Context;
use super::deploy::DeploymentChain;
use crate::config::Action;
use crate::utils::{cmd_command_line, command_line};

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Deploy,
    Remove,
    Status,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 4] = [
        MenuChoice::Deploy,
        MenuChoice::Remove,
        MenuChoice::Status,
        MenuChoice::Exit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuChoice::Deploy => write!(f, "Deploy network"),
            MenuChoice::Remove => write!(f, "Remove network"),
            MenuChoice::Status => write!(f, "Network status"),
            MenuChoice::Exit => write!(f, "Exit"),
        }
    }
}

/// How the menu loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Normal,
    Failure,
}

impl MenuExit {
    pub fn code(self) -> i32 {
        match self {
            MenuExit::Normal => 0,
            MenuExit::Failure => 1,
        }
    }
}

/// Source of user answers
pub trait Prompter {
    fn choose(&mut self, choices: &[MenuChoice]) -> Result<MenuChoice>;

    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Terminal prompts via dialoguer
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose(&mut self, choices: &[MenuChoice]) -> Result<MenuChoice> {
        let index = crate::utils::select("What do you want to do?", choices)?;
        Ok(choices[index])
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        crate::utils::confirm(prompt)
    }
}

pub struct Menu<'a, P: Prompter> {
    ctx: &'a Context,
    prompter: P,
    port: u16,
}

impl<'a, P: Prompter> Menu<'a, P> {
    pub fn new(ctx: &'a Context, prompter: P, port: u16) -> Self {
        Self {
            ctx,
            prompter,
            port,
        }
    }

    /// Show the menu until the user exits or declines to retry after an error
    pub fn run(&mut self) -> MenuExit {
        loop {
            let outcome = self
                .prompter
                .choose(&MenuChoice::ALL)
                .and_then(|choice| self.dispatch(choice));

            match outcome {
                Ok(true) => continue,
                Ok(false) => {
                    self.ctx.log.info("Exiting...");
                    return MenuExit::Normal;
                }
                Err(e) => {
                    self.ctx.log.error(format!("{:#}", e));
                    match self.prompter.confirm("An error occurred. Do you want to try again?") {
                        Ok(true) => continue,
                        Ok(false) => return MenuExit::Failure,
                        Err(prompt) => {
                            self.ctx.log.error(format!("{:#}", prompt));
                            return MenuExit::Failure;
                        }
                    }
                }
            }
        }
    }

    /// Returns false when the menu should close
    fn dispatch(&mut self, choice: MenuChoice) -> Result<bool> {
        match choice {
            MenuChoice::Deploy => self.run_chain(Action::Create)?,
            MenuChoice::Remove => {
                if self.ctx.settings.behavior.confirm_destructive
                    && !self
                        .prompter
                        .confirm("Remove the whole network (images, clusters and resources)?")?
                {
                    self.ctx.log.info("Removal cancelled");
                } else {
                    self.run_chain(Action::Remove)?;
                }
            }
            MenuChoice::Status => {
                let url = format!("http://localhost:{}/status/pods", self.port);
                self.ctx.log.info(format!("Opening {}", url));
                self.ctx.runner.run(&open_command(&url))?;
            }
            MenuChoice::Exit => return Ok(false),
        }

        Ok(true)
    }

    fn run_chain(&self, action: Action) -> Result<()> {
        let chain = DeploymentChain::new(
            self.ctx.runner.as_ref(),
            &self.ctx.settings,
            self.ctx.log.child("chain"),
        );
        let report = chain.run(action)?;
        self.ctx.log.info(&report);
        Ok(())
    }
}

/// Command that opens `url` in the platform browser
pub fn open_command(url: &str) -> String {
    if cfg!(target_os = "macos") {
        command_line(["open", url])
    } else if cfg!(windows) {
        cmd_command_line(["start", "", url])
    } else {
        command_line(["xdg-open", url])
    }
}

/// Run the menu against the terminal
pub fn show_menu(ctx: &Context, port: u16) -> MenuExit {
    println!();
    println!("==========================================");
    println!("chainnet-dev");
    println!("==========================================");

    Menu::new(ctx, TerminalPrompter, port).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::utils::shell::testing::RecordingRunner;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct ScriptedPrompter {
        choices: VecDeque<MenuChoice>,
        answers: VecDeque<bool>,
        asked: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(choices: &[MenuChoice], answers: &[bool]) -> Self {
            Self {
                choices: choices.iter().copied().collect(),
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for &mut ScriptedPrompter {
        fn choose(&mut self, _choices: &[MenuChoice]) -> Result<MenuChoice> {
            self.choices
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no more input"))
        }

        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            self.asked.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no more input"))
        }
    }

    fn context(runner: Arc<RecordingRunner>) -> Context {
        let mut settings = Settings::default();
        settings.behavior.show_progress = false;
        Context::with_runner(settings, runner)
    }

    #[test]
    fn test_exit_is_normal() {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = context(runner.clone());
        let mut prompter = ScriptedPrompter::new(&[MenuChoice::Exit], &[]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Normal);
        assert_eq!(exit.code(), 0);
        assert!(runner.calls().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_status_opens_pods_endpoint() {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = context(runner.clone());
        let mut prompter = ScriptedPrompter::new(&[MenuChoice::Status, MenuChoice::Exit], &[]);

        let exit = Menu::new(&ctx, &mut prompter, 4100).run();
        assert_eq!(exit, MenuExit::Normal);
        assert_eq!(
            runner.calls(),
            vec!["xdg-open http://localhost:4100/status/pods"]
        );
    }

    #[test]
    fn test_error_then_decline_is_failure() {
        let runner = Arc::new(RecordingRunner::new().failing_on("docker info"));
        let ctx = context(runner.clone());
        let mut prompter = ScriptedPrompter::new(&[MenuChoice::Deploy], &[false]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Failure);
        assert_eq!(exit.code(), 1);
        assert_eq!(prompter.asked.len(), 1);
        assert!(runner.calls_matching("minikube").is_empty());
    }

    #[test]
    fn test_error_then_retry_loops() {
        let runner = Arc::new(RecordingRunner::new().failing_on("docker info"));
        let ctx = context(runner.clone());
        let mut prompter =
            ScriptedPrompter::new(&[MenuChoice::Deploy, MenuChoice::Exit], &[true]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Normal);
        assert_eq!(runner.calls_matching("docker info").len(), 1);
    }

    #[test]
    fn test_prompt_failure_asks_to_retry() {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = context(runner);
        // No scripted choices: the first prompt fails
        let mut prompter = ScriptedPrompter::new(&[], &[false]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Failure);
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn test_clean_removal_does_not_ask_to_retry() {
        let runner = Arc::new(
            RecordingRunner::new().failing_after("minikube delete", "kubectl cluster-info"),
        );
        let ctx = context(runner.clone());
        let mut prompter = ScriptedPrompter::new(&[MenuChoice::Remove, MenuChoice::Exit], &[true]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Normal);
        assert_eq!(prompter.asked.len(), 1);
        assert_eq!(runner.calls_matching("minikube delete").len(), 2);
    }

    #[test]
    fn test_remove_can_be_cancelled() {
        let runner = Arc::new(RecordingRunner::new());
        let ctx = context(runner.clone());
        let mut prompter = ScriptedPrompter::new(&[MenuChoice::Remove, MenuChoice::Exit], &[false]);

        let exit = Menu::new(&ctx, &mut prompter, 3000).run();
        assert_eq!(exit, MenuExit::Normal);
        assert!(runner.calls().is_empty());
    }
}
