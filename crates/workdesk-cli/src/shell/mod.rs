mod commands;

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use workdesk_core::draft::{ClarificationAnswers, CLARIFICATION_QUESTIONS};

use crate::agent::Agent;
use crate::dispatch::{FollowUp, Reply};
use crate::format::{paint, separator, system_line, CYAN, DIM, RESET, WHITE_BOLD, YELLOW};

type InputLines = Lines<BufReader<Stdin>>;

/// Line-oriented interactive loop over stdin/stdout.
pub struct Shell {
    agent: Agent,
    session_id: String,
}

fn print_lines(lines: &[String]) {
    let mut out = std::io::stdout();
    for line in lines {
        writeln!(out, "{}", line).ok();
    }
    out.flush().ok();
}

fn prompt(text: &str) {
    let mut out = std::io::stdout();
    write!(out, "{}", text).ok();
    out.flush().ok();
}

impl Shell {
    pub fn new(agent: Agent, session_id: String) -> Self {
        Self { agent, session_id }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();

        println!("{WHITE_BOLD}workdesk{RESET} {DIM}- type 'help' for commands, 'exit' to quit{RESET}");
        println!();

        loop {
            prompt(&format!("{CYAN}> {RESET}"));
            let Some(line) = input.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(command) = line.strip_prefix('/') {
                print_lines(&commands::handle_slash_command(&mut self.agent, command));
                continue;
            }

            let reply = self.agent.handle_line(&self.session_id, line).await;
            print_lines(&paint(&reply));

            match reply.follow_up {
                FollowUp::None => {}
                FollowUp::Exit => break,
                FollowUp::Clarify => {
                    if let Some(reply) = self.clarify(&mut input).await? {
                        print_lines(&paint(&reply));
                    }
                }
                FollowUp::Recipients => {
                    prompt(&format!("{YELLOW}Recipients: {RESET}"));
                    if let Some(recipients) = input.next_line().await? {
                        let reply = self.agent.send_draft_to(&self.session_id, &recipients).await;
                        print_lines(&paint(&reply));
                    }
                }
            }
            println!("{}", separator());
        }
        Ok(())
    }

    /// Ask the clarification questions in order. `None` if input ended early.
    async fn clarify(&self, input: &mut InputLines) -> Result<Option<Reply>> {
        print_lines(&[system_line("Let's gather the details.")]);
        let mut answers = Vec::with_capacity(CLARIFICATION_QUESTIONS.len());
        for question in CLARIFICATION_QUESTIONS {
            prompt(&format!("{YELLOW}{question}{RESET}"));
            let Some(answer) = input.next_line().await? else {
                return Ok(None);
            };
            answers.push(answer);
        }
        let answers = ClarificationAnswers::from_answers(&answers);
        Ok(Some(self.agent.draft_from_answers(&self.session_id, answers).await))
    }
}
