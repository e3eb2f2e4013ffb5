mod pages;
mod replay;

pub use pages::run_pages;
pub use replay::run_replay;

use rpnpad_core::config::KeypadConfig;
use rpnpad_core::dispatch::DispatchController;
use rpnpad_core::evaluator::keypad_channel;

use crate::engines::TranscriptEvaluator;

/// A controller wired to a fresh transcript evaluator
pub fn session(config: &KeypadConfig) -> DispatchController<TranscriptEvaluator> {
    let (link, events) = keypad_channel();
    let evaluator = TranscriptEvaluator::spawn(&config.evaluator, config.pages(), link);
    DispatchController::new(evaluator, events)
}
