//! Deterministic software core
//!
//! A small fetch-and-mix machine over a ROM image. It has no cycle accuracy
//! and emulates no real hardware, but it is fully deterministic, reacts to
//! every input bit, and exposes the same state block layout a console core
//! does: CPU registers and work RAM are always serialized, while the video
//! (`TIA`) and sound (`Audio`) blocks are output-only and can be disabled.

use byteorder::{ByteOrder, LittleEndian};

use crate::input::{ConsoleButtons, InputFrame};
use crate::state::{
    DIFFERENTIAL_BLOCK_HEADER, StateBlockSet, StateError, StateReader, StateWriter,
};

use super::{CoreError, EmulatorCore};

pub const TIA_BLOCK: &str = "TIA";
pub const AUDIO_BLOCK: &str = "Audio";

const CPU_STATE_SIZE: usize = 16;
const RAM_SIZE: usize = 128;
const TIA_SIZE: usize = 64;
const AUDIO_SIZE: usize = 16;

const MAX_ROM_SIZE: usize = 64 * 1024;
const CYCLES_PER_FRAME: usize = 76;
const RESET_SP: u8 = 0xFD;
const RESET_FLAGS: u8 = 0x24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cpu {
    pc: u16,
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    flags: u8,
    /// Console switches latched by the last frame
    switches: u8,
    frame: u64,
}

impl Cpu {
    fn encode(&self) -> [u8; CPU_STATE_SIZE] {
        let mut out = [0u8; CPU_STATE_SIZE];
        LittleEndian::write_u16(&mut out[0..2], self.pc);
        out[2] = self.a;
        out[3] = self.x;
        out[4] = self.y;
        out[5] = self.sp;
        out[6] = self.flags;
        out[7] = self.switches;
        LittleEndian::write_u64(&mut out[8..16], self.frame);
        out
    }

    fn decode(bytes: &[u8; CPU_STATE_SIZE]) -> Self {
        Self {
            pc: LittleEndian::read_u16(&bytes[0..2]),
            a: bytes[2],
            x: bytes[3],
            y: bytes[4],
            sp: bytes[5],
            flags: bytes[6],
            switches: bytes[7],
            frame: LittleEndian::read_u64(&bytes[8..16]),
        }
    }
}

pub struct ReferenceCore {
    rom: Vec<u8>,
    cpu: Cpu,
    ram: [u8; RAM_SIZE],
    tia: [u8; TIA_SIZE],
    audio: [u8; AUDIO_SIZE],
    blocks: StateBlockSet,
}

impl Default for ReferenceCore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceCore {
    pub fn new() -> Self {
        Self {
            rom: Vec::new(),
            cpu: Cpu::default(),
            ram: [0; RAM_SIZE],
            tia: [0; TIA_SIZE],
            audio: [0; AUDIO_SIZE],
            blocks: StateBlockSet::new([TIA_BLOCK, AUDIO_BLOCK]),
        }
    }

    /// Little-endian vector in the last two ROM bytes
    fn reset_vector(&self) -> u16 {
        match self.rom.len() {
            0 | 1 => 0,
            len => LittleEndian::read_u16(&self.rom[len - 2..]),
        }
    }

    fn fetch(&self) -> u8 {
        if self.rom.is_empty() {
            return 0;
        }
        self.rom[self.cpu.pc as usize % self.rom.len()]
    }

    fn reset_registers(&mut self) {
        self.cpu.pc = self.reset_vector();
        self.cpu.a = 0;
        self.cpu.x = 0;
        self.cpu.y = 0;
        self.cpu.sp = RESET_SP;
        self.cpu.flags = RESET_FLAGS;
    }
}

impl EmulatorCore for ReferenceCore {
    fn name(&self) -> &str {
        "Reference"
    }

    fn load_rom(&mut self, rom: &[u8]) -> Result<(), CoreError> {
        if rom.is_empty() || rom.len() > MAX_ROM_SIZE {
            return Err(CoreError::RomRejected {
                core: self.name().to_string(),
                reason: format!("size {} outside 1..={MAX_ROM_SIZE} bytes", rom.len()),
            });
        }
        self.rom = rom.to_vec();
        self.hard_reset();
        Ok(())
    }

    fn advance(&mut self, frame: &InputFrame) {
        let switches = frame.console.difference(ConsoleButtons::POWER | ConsoleButtons::RESET);
        let inputs = [frame.port1.code(), frame.port2.code(), switches.bits()];
        self.cpu.switches = switches.bits();

        for cycle in 0..CYCLES_PER_FRAME {
            let op = self.fetch();
            let cpu = &mut self.cpu;
            let address = (op ^ cpu.x) as usize % RAM_SIZE;

            cpu.a = (cpu.a.wrapping_add(op).rotate_left(1) ^ inputs[cycle % inputs.len()])
                .wrapping_add(self.ram[address]);
            cpu.x = cpu.x.wrapping_add(cpu.a >> 1);
            cpu.y ^= op.wrapping_mul(3);
            cpu.flags = (cpu.a & 0x80) | (u8::from(cpu.a == 0) << 1);

            self.ram[address] = self.ram[address].wrapping_add(cpu.a) ^ cpu.y;
            self.tia[cycle % TIA_SIZE] = cpu.a ^ cpu.x;

            cpu.pc = cpu.pc.wrapping_add(1 + u16::from(op & 0x03));
        }

        let voice = (self.cpu.frame % AUDIO_SIZE as u64) as usize;
        self.audio[voice] = self.cpu.a.wrapping_add(self.cpu.y);
        self.cpu.frame = self.cpu.frame.wrapping_add(1);
    }

    fn soft_reset(&mut self) {
        self.reset_registers();
    }

    fn hard_reset(&mut self) {
        self.cpu = Cpu::default();
        self.ram = [0; RAM_SIZE];
        self.tia = [0; TIA_SIZE];
        self.audio = [0; AUDIO_SIZE];
        self.reset_registers();
    }

    fn peek_work_ram(&self, address: usize) -> u8 {
        self.ram.get(address).copied().unwrap_or(0)
    }

    fn state_blocks(&self) -> &StateBlockSet {
        &self.blocks
    }

    fn state_blocks_mut(&mut self) -> &mut StateBlockSet {
        &mut self.blocks
    }

    fn state_size(&self) -> usize {
        let mut size = CPU_STATE_SIZE + RAM_SIZE;
        if self.blocks.is_enabled(TIA_BLOCK) {
            size += TIA_SIZE;
        }
        if self.blocks.is_enabled(AUDIO_BLOCK) {
            size += AUDIO_SIZE;
        }
        size
    }

    fn differential_state_size(&self) -> usize {
        let mut size = CPU_STATE_SIZE + DIFFERENTIAL_BLOCK_HEADER;
        if self.blocks.is_enabled(TIA_BLOCK) {
            size += DIFFERENTIAL_BLOCK_HEADER;
        }
        if self.blocks.is_enabled(AUDIO_BLOCK) {
            size += AUDIO_SIZE;
        }
        size
    }

    fn serialize_state(&self, writer: &mut dyn StateWriter) -> Result<(), StateError> {
        writer.push_contiguous(&self.cpu.encode())?;
        writer.push_differential(&self.ram)?;
        if self.blocks.is_enabled(TIA_BLOCK) {
            writer.push_differential(&self.tia)?;
        }
        if self.blocks.is_enabled(AUDIO_BLOCK) {
            writer.push_contiguous(&self.audio)?;
        }
        Ok(())
    }

    fn deserialize_state(&mut self, reader: &mut dyn StateReader) -> Result<(), StateError> {
        let mut cpu = [0u8; CPU_STATE_SIZE];
        reader.pop_contiguous(&mut cpu)?;
        self.cpu = Cpu::decode(&cpu);
        reader.pop_differential(&mut self.ram)?;
        if self.blocks.is_enabled(TIA_BLOCK) {
            reader.pop_differential(&mut self.tia)?;
        }
        if self.blocks.is_enabled(AUDIO_BLOCK) {
            reader.pop_contiguous(&mut self.audio)?;
        }
        Ok(())
    }
}
