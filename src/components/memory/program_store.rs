use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::debug;

use crate::component::{stateful_input, Component};
use crate::connection::{Input, WiringRegistry};
use crate::error::ProgramError;
use crate::line::{Line, WeakLine};
use crate::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Register becomes register XOR operand, program counter steps to the next address.
    Xor,
    /// Program counter becomes the operand, register unchanged.
    Jmp,
}

impl Opcode {
    pub fn from_signal(bit: Signal) -> Self {
        match bit {
            Signal::Low => Opcode::Xor,
            Signal::High => Opcode::Jmp,
        }
    }

    pub fn to_signal(self) -> Signal {
        match self {
            Opcode::Xor => Signal::Low,
            Opcode::Jmp => Signal::High,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Xor => "XOR",
            Opcode::Jmp => "JMP",
        }
    }
}

/// One 2-bit program word: the two switches of a dip-switch pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionWord {
    pub opcode: Opcode,
    pub operand: Signal,
}

impl InstructionWord {
    pub fn new(opcode: Opcode, operand: Signal) -> Self {
        InstructionWord { opcode, operand }
    }

    pub fn xor(operand: Signal) -> Self {
        Self::new(Opcode::Xor, operand)
    }

    pub fn jmp(target: Signal) -> Self {
        Self::new(Opcode::Jmp, target)
    }

    /// Build a word from its raw (opcode, operand) bits.
    pub fn from_bits(opcode: Signal, operand: Signal) -> Self {
        Self::new(Opcode::from_signal(opcode), operand)
    }

    /// Split into the levels driven on the (opcode, operand) lines.
    pub fn decode(self) -> (Signal, Signal) {
        (self.opcode.to_signal(), self.operand)
    }
}

impl Default for InstructionWord {
    fn default() -> Self {
        InstructionWord::xor(Signal::Low)
    }
}

impl fmt::Display for InstructionWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.opcode.mnemonic(), self.operand.to_char())
    }
}

impl FromStr for InstructionWord {
    type Err = ProgramError;

    /// Parse the `XOR 1` / `JMP 0` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(mnemonic), Some(operand), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ProgramError::UnknownMnemonic(s.to_string()));
        };
        let opcode = match mnemonic.to_ascii_uppercase().as_str() {
            "XOR" => Opcode::Xor,
            "JMP" => Opcode::Jmp,
            _ => return Err(ProgramError::UnknownMnemonic(s.to_string())),
        };
        let operand = match operand {
            "0" => Signal::Low,
            "1" => Signal::High,
            _ => return Err(ProgramError::UnknownMnemonic(s.to_string())),
        };
        Ok(InstructionWord::new(opcode, operand))
    }
}

#[derive(Debug)]
struct StoreState {
    words: Vec<InstructionWord>,
    address: Vec<Signal>,
}

impl StoreState {
    fn address(&self) -> usize {
        self.address
            .iter()
            .enumerate()
            .map(|(bit, level)| (level.to_bool() as usize) << bit)
            .sum()
    }

    fn current(&self) -> InstructionWord {
        self.words[self.address()]
    }
}

fn drive_word(opcode: &WeakLine, operand: &WeakLine, word: InstructionWord) {
    let (opcode_level, operand_level) = word.decode();
    opcode.set_level(opcode_level);
    operand.set_level(operand_level);
}

/// The program "ROM": a table of words addressed by `log2(size)` address lines.
///
/// The table can be burnt again at any time; the outputs follow immediately.
pub struct ProgramStore {
    name: String,
    state: Rc<RefCell<StoreState>>,
    address: Vec<Input>,
    opcode: Line,
    operand: Line,
}

impl ProgramStore {
    pub fn new(
        name: impl Into<String>,
        program: Vec<InstructionWord>,
        registry: &mut WiringRegistry,
    ) -> Result<Self, ProgramError> {
        let size = program.len();
        if !size.is_power_of_two() {
            return Err(ProgramError::InvalidSize(size));
        }
        let width = size.trailing_zeros() as usize;

        let name = name.into();
        let opcode = Line::new(format!("{}.opcode", name));
        let operand = Line::new(format!("{}.operand", name));
        let state = Rc::new(RefCell::new(StoreState {
            words: program,
            address: vec![Signal::Low; width],
        }));

        let address = (0..width)
            .map(|bit| {
                let (op, arg) = (opcode.downgrade(), operand.downgrade());
                stateful_input(
                    registry,
                    &name,
                    &format!("address{}", bit),
                    &state,
                    move |s, level| {
                        s.address[bit] = level;
                        s.current()
                    },
                    move |word| drive_word(&op, &arg, word),
                )
            })
            .collect();

        let word = state.borrow().current();
        drive_word(&opcode.downgrade(), &operand.downgrade(), word);

        Ok(ProgramStore {
            name,
            state,
            address,
            opcode,
            operand,
        })
    }

    /// Replace the whole table at once and drive the word now addressed.
    pub fn burn(&self, words: Vec<InstructionWord>) -> Result<(), ProgramError> {
        let word = {
            let mut s = self.state.borrow_mut();
            if words.len() != s.words.len() {
                return Err(ProgramError::WrongLength {
                    expected: s.words.len(),
                    actual: words.len(),
                });
            }
            s.words = words;
            s.current()
        };
        debug!(store = %self.name, program = %self.listing().join(", "), "program burnt");
        drive_word(&self.opcode.downgrade(), &self.operand.downgrade(), word);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.state.borrow().words.len()
    }

    pub fn address_width(&self) -> usize {
        self.address.len()
    }

    pub fn address_input(&self, bit: usize) -> &Input {
        &self.address[bit]
    }

    pub fn current_address(&self) -> usize {
        self.state.borrow().address()
    }

    pub fn read(&self, address: usize) -> Option<InstructionWord> {
        self.state.borrow().words.get(address).copied()
    }

    pub fn current_instruction(&self) -> InstructionWord {
        self.state.borrow().current()
    }

    /// Human-readable program, one mnemonic per address.
    pub fn listing(&self) -> Vec<String> {
        self.state
            .borrow()
            .words
            .iter()
            .map(|w| w.to_string())
            .collect()
    }

    pub fn opcode(&self) -> &Line {
        &self.opcode
    }

    pub fn operand(&self) -> &Line {
        &self.operand
    }
}

impl Component for ProgramStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<&Input> {
        self.address.iter().collect()
    }

    fn outputs(&self) -> Vec<(&'static str, &Line)> {
        vec![("opcode", &self.opcode), ("operand", &self.operand)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::{High as H, Low as L};

    fn program(words: &[&str]) -> Vec<InstructionWord> {
        words.iter().map(|w| w.parse().unwrap()).collect()
    }

    #[test]
    fn test_mnemonic_round_trip() {
        let word: InstructionWord = "jmp 1".parse().unwrap();
        assert_eq!(word, InstructionWord::jmp(H));
        assert_eq!(word.to_string(), "JMP 1");
        assert_eq!(word.decode(), (H, H));
        assert_eq!(InstructionWord::from_bits(L, H), InstructionWord::xor(H));
    }

    #[test]
    fn test_bad_mnemonics() {
        for text in ["NOP 0", "XOR", "XOR 2", "XOR 0 1", ""] {
            assert!(
                matches!(text.parse::<InstructionWord>(), Err(ProgramError::UnknownMnemonic(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_size_must_be_power_of_two() {
        let mut registry = WiringRegistry::new();
        let err = ProgramStore::new("rom", program(&["XOR 0", "XOR 0", "XOR 0"]), &mut registry)
            .err()
            .unwrap();
        assert_eq!(err, ProgramError::InvalidSize(3));
        assert!(ProgramStore::new("rom", Vec::new(), &mut registry).is_err());
    }

    #[test]
    fn test_decodes_address_zero_at_power_up() {
        let mut registry = WiringRegistry::new();
        let rom = ProgramStore::new("rom", program(&["JMP 1", "XOR 0"]), &mut registry).unwrap();
        assert_eq!(rom.address_width(), 1);
        assert_eq!(rom.opcode().level(), H);
        assert_eq!(rom.operand().level(), H);
    }

    #[test]
    fn test_address_line_selects_word() {
        let mut registry = WiringRegistry::new();
        let rom = ProgramStore::new("rom", program(&["XOR 0", "JMP 1"]), &mut registry).unwrap();
        let address = Line::new("pc");
        registry.connect(&address, rom.address_input(0)).unwrap();

        address.set_level(H);
        assert_eq!(rom.current_address(), 1);
        assert_eq!((rom.opcode().level(), rom.operand().level()), (H, H));
        assert_eq!(rom.current_instruction().to_string(), "JMP 1");

        address.set_level(L);
        assert_eq!((rom.opcode().level(), rom.operand().level()), (L, L));
    }

    #[test]
    fn test_wider_address_space() {
        let mut registry = WiringRegistry::new();
        let rom = ProgramStore::new(
            "rom",
            program(&["XOR 0", "XOR 1", "JMP 0", "JMP 1"]),
            &mut registry,
        )
        .unwrap();
        let a0 = Line::new("a0");
        let a1 = Line::new("a1");
        registry.connect(&a0, rom.address_input(0)).unwrap();
        registry.connect(&a1, rom.address_input(1)).unwrap();

        a1.set_level(H);
        assert_eq!(rom.current_instruction(), InstructionWord::jmp(L));
        a0.set_level(H);
        assert_eq!(rom.current_address(), 3);
        assert_eq!(rom.current_instruction(), InstructionWord::jmp(H));
    }

    #[test]
    fn test_burn_replaces_table_and_drives_outputs() {
        let mut registry = WiringRegistry::new();
        let rom = ProgramStore::new("rom", program(&["XOR 0", "XOR 0"]), &mut registry).unwrap();
        assert_eq!(rom.operand().level(), L);

        rom.burn(program(&["XOR 1", "JMP 0"])).unwrap();
        assert_eq!(rom.operand().level(), H);
        assert_eq!(rom.listing(), vec!["XOR 1", "JMP 0"]);
    }

    #[test]
    fn test_burn_with_wrong_length_leaves_table_untouched() {
        let mut registry = WiringRegistry::new();
        let rom = ProgramStore::new("rom", program(&["XOR 1", "XOR 0"]), &mut registry).unwrap();

        let err = rom.burn(program(&["JMP 1"])).unwrap_err();
        assert_eq!(err, ProgramError::WrongLength { expected: 2, actual: 1 });
        assert_eq!(rom.read(0), Some(InstructionWord::xor(H)));
        assert_eq!(rom.read(2), None);
    }
}
