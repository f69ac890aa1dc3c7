use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

const DICTIONARY: &str = "ACE,ACT,AID,AIM,AIR,ALE,ALL,AND,ANT,APT,ARM,ART,AWE,AYE,BAD,BAG,BAR,BAT,BAY,BED,BEE,BEG,BET,BID,BIG,BIT,BIZ,BOB,BOW,BOY,BUT,BUY,BYE,CAN,CAP,CAR,CAT,COP,COT,COW,CUE,CUP,CUT,DAD,DAM,DAY,DIE,DIG,DIM,DIP,DOG,DOT,DRY,DUE,DUG,DUO,DYE,EAR,EAT,FAN,FAQ,FAR,FAT,FAX,FED,FEE,FEN,FEW,FIN,FIT,FIX,FLY,FOG,FOR,FRK,FRQ,FRY,FUN,FUR,GET,GIG,GIN,GUM,GUT,GUY,HAM,HAT,HAY,HEN,HER,HEY,HIM,HIP,HIT,HOP,HOT,HOW,HUT,ILK,ILL,IND,INK,IRK,JAM,JAR,JAW,JOB,JOY,KID,KIN,KIT,LAD,LAP,LAW,LAY,LEG,LET,LID,LIE,LIP,LIT,LOG,LOO,LOT,LOW,LUA,LUG,MAD,MAN,MAP,MAT,MAX,MAY,MIC,MID,MIX,MOB,MOD,MUD,MUG,MUM,NET,NEW,NIL,NLL,NOD,NOR,NOT,NOW,NUN,NUT,OIL,OPT,OUR,OUT,OWE,OWL,PAD,PAN,PAR,PAT,PAY,PEG,PEN,PER,PET,PIE,PIG,PIN,PIT,POP,POT,POW,PUB,PUT,QUA,QUE,QUO,RAG,RAM,RAT,RAW,RED,RGB,RIB,RID,RIG,RIM,ROB,ROD,ROT,ROW,RUB,RUG,RUM,RUN,SAD,SAW,SAY,SEA,SEE,SET,SHE,SHY,SIC,SIG,SIN,SIR,SIT,SIX,SLY,SND,SUE,SUM,SUN,TAG,TAP,TAX,TEA,TEE,TEN,TGB,THY,TIE,TIN,TIP,TOE,TOO,TOP,TOY,TRN,TRY,TUB,VAT,VET,WAR,WAX,WAY,WEE,WET,WHY,WIG,WIN,WIT,WIZ,WRY,YEN,YET,ZAG,ZIG";

pub const SLOTS: usize = 3;
pub const LETTERS_PER_SLOT: usize = 3;

/// Three-letter words a letter display may spell
pub fn dictionary() -> impl Iterator<Item = &'static str> {
    DICTIONARY.split(',')
}

fn is_word(candidate: &str) -> bool {
    dictionary().any(|w| w == candidate)
}

/// Three rotating letter slots. The state is the index of the spelled word
/// among the sorted dictionary words the slots can form.
#[derive(Debug, Clone)]
pub struct LetterDisplay {
    letters: [[char; LETTERS_PER_SLOT]; SLOTS],
    positions: [usize; SLOTS],
    words: Vec<String>,
    state: State,
}

impl LetterDisplay {
    pub fn new(letters: [[char; LETTERS_PER_SLOT]; SLOTS]) -> Self {
        let mut words = Vec::new();
        for &a in &letters[0] {
            for &b in &letters[1] {
                for &c in &letters[2] {
                    let candidate: String = [a, b, c].iter().collect();
                    if is_word(&candidate) {
                        words.push(candidate);
                    }
                }
            }
        }
        words.sort();
        words.dedup();

        let mut display = Self {
            letters,
            positions: [0; SLOTS],
            words,
            state: State::Unset,
        };
        display.state = display.spelled_state();
        display
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Word currently spelled, dictionary or not
    pub fn spelled(&self) -> String {
        (0..SLOTS).map(|s| self.letters[s][self.positions[s]]).collect()
    }

    fn spelled_state(&self) -> State {
        let spelled = self.spelled();
        State::from(self.words.iter().position(|w| *w == spelled).map(|i| i as u32))
    }

    fn word(&self, state: u32) -> &str {
        self.words.get(state as usize).map_or("?", String::as_str)
    }
}

impl Component for LetterDisplay {
    fn kind(&self) -> FactoryKind {
        FactoryKind::LetterDisplay
    }

    fn flavor(&self) -> Flavor {
        Flavor::LetterDisplay
    }

    fn num_states(&self) -> u32 {
        self.words.len() as u32
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        let slot = match action {
            Action::PressSlot(slot) => *slot,
            other => {
                return Err(InputError::Unsupported {
                    component: self.describe(),
                    action: other.clone(),
                })
            }
        };
        if slot >= SLOTS {
            return Err(InputError::OutOfRange {
                component: self.describe(),
                index: slot,
            });
        }
        self.positions[slot] = (self.positions[slot] + 1) % LETTERS_PER_SLOT;
        let to = self.spelled_state();
        Ok(set_state(&mut self.state, to))
    }

    fn describe(&self) -> String {
        format!("letter display which can spell {}", self.words.join(", "))
    }

    fn readout(&self) -> String {
        self.spelled()
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the letter display to {}", self.word(state))
    }

    fn describe_action(&self) -> String {
        "you changed the letter display".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Unset => "an invalid word",
            State::Value(v) => self.word(v),
        };
        format!(
            "you should have set the letter display to {} (you set it to {})",
            self.word(state),
            actual
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct LetterDisplayFactory;

impl LetterDisplayFactory {
    /// Slot letters that can spell at least two dictionary words
    fn draw_letters(rng: &mut StdRng) -> [[char; LETTERS_PER_SLOT]; SLOTS] {
        let words: Vec<&str> = dictionary().collect();
        let picks: Vec<&str> = words.choose_multiple(rng, 2).copied().collect();
        let (first, second): (Vec<char>, Vec<char>) = (picks[0].chars().collect(), picks[1].chars().collect());

        let mut letters = [[' '; LETTERS_PER_SLOT]; SLOTS];
        for slot in 0..SLOTS {
            let mut pool = vec![first[slot]];
            if second[slot] != first[slot] {
                pool.push(second[slot]);
            }
            while pool.len() < LETTERS_PER_SLOT {
                let extra = (b'A' + rng.gen_range(0..26u8)) as char;
                if !pool.contains(&extra) {
                    pool.push(extra);
                }
            }
            pool.shuffle(rng);
            letters[slot].copy_from_slice(&pool);
        }
        letters
    }
}

impl ComponentFactory for LetterDisplayFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::LetterDisplay
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::LetterDisplay]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if occupancy.is_flavor_taken(Flavor::LetterDisplay) {
            return None;
        }
        let footprint = pick_rect(occupancy, 4, 3, rng)?;
        let letters = Self::draw_letters(rng);
        Some(ComponentInstance::new(
            id,
            footprint,
            Box::new(LetterDisplay::new(letters)),
        ))
    }
}
