use std::path::PathBuf;

use anyhow::Result;
use apex_core::Phase;
use apex_experiment::{ExperimentConfig, Session, SessionDecision};
use apex_timing::{Clock, ManualClock, MonotonicClock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::export;
use crate::participant::SimulatedParticipant;
use crate::Args;

pub struct App {
    session: Session<StdRng>,
    out_dir: PathBuf,
    realtime: bool,
    tap_rate: f64,
    release_probability: f64,
    seed: u64,
}

impl App {
    pub fn new(config: ExperimentConfig, args: &Args, seed: u64) -> Result<Self> {
        let session = Session::new(config, &args.participant, StdRng::seed_from_u64(seed))?;
        Ok(Self {
            session,
            out_dir: args.out.clone(),
            realtime: args.realtime,
            tap_rate: args.tap_rate,
            release_probability: args.release_probability,
            seed,
        })
    }

    pub fn run(mut self) -> Result<()> {
        println!("=== COGNITIVE APATHY TASK ===");
        println!("Seed: {}", self.seed);
        println!(
            "Blocks: {}",
            self.session
                .block_order()
                .blocks()
                .iter()
                .map(|b| b.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let drive_result = self.drive();

        // records are flushed even when the run ends early or errors out
        export::write_csv(&self.out_dir.join("trials.csv"), self.session.outcomes())?;
        export::write_json(&self.out_dir.join("trials.json"), self.session.outcomes())?;
        let summary = self.session.summary();
        export::write_summary(&self.out_dir.join("summary.json"), &summary)?;

        println!("\nTrials recorded: {}", summary.total_trials);
        println!("Median tap count: {:.1}", summary.median_tap_count);
        println!("Total reward: {:.2}", summary.total_reward);
        if let Some(reason) = summary.aborted {
            println!("Ended early: {:?}", reason);
        }
        println!("Records saved to {}", self.out_dir.display());

        drive_result
    }

    fn drive(&mut self) -> Result<()> {
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        if self.realtime {
            let participant = SimulatedParticipant::new(
                MonotonicClock::new(),
                rng,
                self.tap_rate,
                self.release_probability,
            );
            drive_session(&mut self.session, participant)
        } else {
            let participant = SimulatedParticipant::new(
                ManualClock::new(),
                rng,
                self.tap_rate,
                self.release_probability,
            );
            drive_session(&mut self.session, participant)
        }
    }
}

fn drive_session<C: Clock, R: Rng>(
    session: &mut Session<StdRng>,
    mut participant: SimulatedParticipant<C, R>,
) -> Result<()> {
    if session.phase().is_welcome() {
        println!("Hold the keys down and tap to raise the mercury into the band.");
    }
    while let Some(params) = session.next_trial()? {
        let holds_keys = session.phase().requires_hold_keys();
        let outcome = participant.run_trial(&params, holds_keys)?;
        match session.record_outcome(outcome)? {
            SessionDecision::Aborted(reason) => {
                warn!(?reason, "session ended early");
                break;
            }
            SessionDecision::Finished => break,
            SessionDecision::Continue | SessionDecision::PhaseComplete => {}
        }
    }
    Ok(())
}
