//! Prompt bank.

use rand::Rng;

use super::{error::ValueObjectError, value_object::Prompt};

const DEFAULT_PROMPTS: &[&str] = &[
    "A cat riding a skateboard",
    "A haunted lighthouse",
    "A dragon at the dentist",
    "A snowman on vacation",
    "A robot walking a dog",
    "An octopus playing drums",
    "A pirate ship in a bathtub",
    "A giraffe in an elevator",
    "A wizard doing laundry",
    "A volcano made of ice cream",
    "A penguin delivering mail",
    "A castle on a cloud",
    "A vampire at the beach",
    "A dinosaur learning to skate",
    "A tree growing upside down",
    "A submarine full of cats",
    "A ghost eating spaghetti",
    "A knight fighting a toaster",
    "An astronaut gardening on the moon",
    "A bear stuck in a hammock",
    "A shark wearing sunglasses",
    "A house with chicken legs",
    "A unicorn stuck in traffic",
    "A mermaid at a bus stop",
    "A bee conducting an orchestra",
    "A tiny elephant in a teacup",
    "A lighthouse made of candy",
    "A frog running for president",
    "A snail winning a race",
    "A hot air balloon shaped like a whale",
    "A chef juggling pancakes",
    "A squirrel hoarding smartphones",
    "A cactus hugging a balloon",
    "A train made of books",
    "A cow on a trampoline",
    "A ninja in a library",
    "A turtle with a jetpack",
    "A king who lost his crown",
    "A zombie at a job interview",
    "An owl reading the news",
];

/// Immutable list of prompts.
///
/// Drawing is with replacement: two players, or two rounds, may get the same prompt.
#[derive(Debug, Clone)]
pub struct PromptBank {
    prompts: Vec<Prompt>,
}

impl PromptBank {
    /// Build a bank from a non-empty list of prompts.
    pub fn new<I, S>(prompts: I) -> Result<Self, ValueObjectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prompts = prompts
            .into_iter()
            .map(|p| Prompt::new(p.into()))
            .collect::<Result<Vec<_>, _>>()?;
        if prompts.is_empty() {
            return Err(ValueObjectError::PromptEmpty);
        }
        Ok(Self { prompts })
    }

    /// Pick one prompt uniformly at random.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Prompt {
        // `prompts` is never empty, see `new`
        let index = rng.gen_range(0..self.prompts.len());
        self.prompts[index].clone()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Default for PromptBank {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPTS.iter().copied()).expect("built-in prompts are non-empty")
    }
}
