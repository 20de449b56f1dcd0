//! Host-side stand-ins for the hardware and platform collaborators.
//!
//! - [`SimAc97`] — register-level model of an AC'97 mixer and PCM-out bus
//!   master channel, enough to exercise the driver protocol.
//! - [`HeapDmaAllocator`] — "DMA" pages on the heap with fake bus addresses.
//! - [`StdIrqSync`] — critical section and wait queue on `Mutex`/`Condvar`.
//! - [`NoDelay`] — counts requested delay instead of sleeping.
//! - [`RecordingBus`] — records PCI configuration calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

use crate::codec::registers as mixer;
use crate::constants::PAGE_SIZE;
use crate::dma::buffer::{DmaAllocator, DmaBuffer, PhysAddr};
use crate::dma::registers::{self as bus, Control, Status};
use crate::hw::RegisterIo;
use crate::pci::BusControl;
use crate::sync::{IrqSync, WaitOutcome};

pub const MIXER_BASE: u16 = 0xD000;
pub const BUS_BASE: u16 = 0xD100;

// ── Simulated controller ───────────────────────────────────────────────────

/// Capabilities of the simulated codec.
#[derive(Debug, Clone, Copy)]
pub struct CodecModel {
    revision: u8,
    variable_rate: bool,
    double_rate: bool,
    rate_granularity: u16,
    reset_status: u16,
}

impl CodecModel {
    /// AC'97 2.3 codec locked to 48 kHz.
    pub fn fixed_rate() -> Self {
        Self {
            revision: mixer::REVISION_23,
            variable_rate: false,
            double_rate: false,
            rate_granularity: 1,
            reset_status: 0,
        }
    }

    /// AC'97 2.3 codec with variable rate audio.
    pub fn variable_rate() -> Self {
        Self {
            variable_rate: true,
            ..Self::fixed_rate()
        }
    }

    pub fn with_revision(mut self, revision: u8) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_double_rate(mut self, double_rate: bool) -> Self {
        self.double_rate = double_rate;
        self
    }

    /// The codec rounds programmed rates down to a multiple of this.
    pub fn with_rate_granularity(mut self, granularity: u16) -> Self {
        self.rate_granularity = granularity;
        self
    }

    /// Extended status value the codec comes out of reset with.
    pub fn with_reset_status(mut self, status: u16) -> Self {
        self.reset_status = status;
        self
    }

    fn extended_id(&self) -> u16 {
        ((self.revision as u16) << mixer::EXTENDED_AUDIO_ID_REVISION_SHIFT)
            | self.variable_rate as u16
            | (self.double_rate as u16) << 1
    }
}

struct SimState {
    model: CodecModel,
    mixer: [u16; 64],
    mixer_resets: usize,
    dac_rate_writes: usize,
    global_control: u32,
    descriptor_list_base: u32,
    current_index: u8,
    last_valid_index: u8,
    status: u16,
    control: u8,
    reset_latency: u32,
    reset_reads_remaining: u32,
}

impl SimState {
    fn reset_mixer(&mut self) {
        self.mixer = [0; 64];
        self.mixer[(mixer::MASTER_VOLUME / 2) as usize] = 0x8000;
        self.mixer[(mixer::PCM_OUT_VOLUME / 2) as usize] = 0x8808;
        self.mixer[(mixer::EXTENDED_AUDIO_STATUS_CONTROL / 2) as usize] = self.model.reset_status;
        self.mixer[(mixer::PCM_FRONT_DAC_RATE / 2) as usize] = 48_000;
        self.mixer_resets += 1;
    }

    fn reset_channel(&mut self) {
        self.descriptor_list_base = 0;
        self.current_index = 0;
        self.last_valid_index = 0;
        self.status = Status::DMA_HALTED.bits();
        self.control = 0;
    }

    fn running(&self) -> bool {
        self.control & Control::RUN.bits() != 0
    }

    fn halted(&self) -> bool {
        self.status & Status::DMA_HALTED.bits() != 0
    }

    fn read_mixer(&self, offset: u16) -> u16 {
        if offset == mixer::EXTENDED_AUDIO_ID {
            return self.model.extended_id();
        }
        self.mixer[(offset / 2) as usize % 64]
    }

    fn write_mixer(&mut self, offset: u16, value: u16) {
        match offset {
            mixer::RESET => self.reset_mixer(),
            mixer::EXTENDED_AUDIO_ID => {}
            mixer::EXTENDED_AUDIO_STATUS_CONTROL => {
                let supported = self.model.extended_id() & 0b11;
                self.mixer[(offset / 2) as usize] = (value & !0b11) | (value & supported);
            }
            mixer::PCM_FRONT_DAC_RATE => {
                self.dac_rate_writes += 1;
                let status = self.mixer[(mixer::EXTENDED_AUDIO_STATUS_CONTROL / 2) as usize];
                let latched = if status & 1 != 0 {
                    let clamped = value.min(48_000);
                    clamped - clamped % self.model.rate_granularity
                } else {
                    48_000
                };
                self.mixer[(offset / 2) as usize] = latched;
            }
            _ => self.mixer[(offset / 2) as usize % 64] = value,
        }
    }

    fn read_bus(&mut self, offset: u16) -> u32 {
        let channel = bus::PCM_OUT_CHANNEL;
        match offset {
            o if o == channel + bus::BUFFER_DESCRIPTOR_LIST_BASE => self.descriptor_list_base,
            o if o == channel + bus::CURRENT_INDEX => self.current_index as u32,
            o if o == channel + bus::LAST_VALID_INDEX => self.last_valid_index as u32,
            o if o == channel + bus::STATUS => self.status as u32,
            o if o == channel + bus::CONTROL => {
                if self.control & Control::RESET_REGISTERS.bits() != 0 {
                    if self.reset_reads_remaining > 0 {
                        self.reset_reads_remaining -= 1;
                    } else {
                        self.control &= !Control::RESET_REGISTERS.bits();
                    }
                }
                self.control as u32
            }
            bus::GLOBAL_CONTROL => self.global_control,
            _ => 0,
        }
    }

    fn write_bus(&mut self, offset: u16, value: u32) {
        let channel = bus::PCM_OUT_CHANNEL;
        match offset {
            o if o == channel + bus::BUFFER_DESCRIPTOR_LIST_BASE => {
                self.descriptor_list_base = value
            }
            o if o == channel + bus::LAST_VALID_INDEX => {
                self.last_valid_index = value as u8 & bus::INDEX_MASK;
                // A halted but running engine resumes once LVI moves past CIV
                if self.running() && self.halted() && self.last_valid_index != self.current_index {
                    self.current_index = (self.current_index + 1) & bus::INDEX_MASK;
                    self.status &= !(Status::DMA_HALTED | Status::CURRENT_EQUALS_LAST_VALID).bits();
                }
            }
            o if o == channel + bus::STATUS => {
                self.status &= !(value as u16 & Status::INTERRUPT_ACK.bits());
            }
            o if o == channel + bus::CONTROL => {
                let value = value as u8;
                if value & Control::RESET_REGISTERS.bits() != 0 {
                    self.reset_channel();
                    self.control = Control::RESET_REGISTERS.bits();
                    self.reset_reads_remaining = self.reset_latency;
                } else {
                    self.control = value;
                    if self.running() {
                        self.status &= !Status::DMA_HALTED.bits();
                    } else {
                        self.status |= Status::DMA_HALTED.bits();
                    }
                }
            }
            bus::GLOBAL_CONTROL => self.global_control = value,
            _ => {}
        }
    }
}

/// Shared handle to a simulated AC'97 controller.
#[derive(Clone)]
pub struct SimAc97 {
    state: Arc<Mutex<SimState>>,
}

impl SimAc97 {
    pub fn new(model: CodecModel) -> Self {
        let mut state = SimState {
            model,
            mixer: [0; 64],
            mixer_resets: 0,
            dac_rate_writes: 0,
            global_control: 0,
            descriptor_list_base: 0,
            current_index: 0,
            last_valid_index: 0,
            status: 0,
            control: 0,
            reset_latency: 1,
            reset_reads_remaining: 0,
        };
        state.reset_mixer();
        state.mixer_resets = 0;
        state.reset_channel();
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap()
    }

    fn read(&self, address: u16) -> u32 {
        let mut state = self.state();
        if (MIXER_BASE..MIXER_BASE + 0x80).contains(&address) {
            state.read_mixer(address - MIXER_BASE) as u32
        } else if (BUS_BASE..BUS_BASE + 0x40).contains(&address) {
            state.read_bus(address - BUS_BASE)
        } else {
            panic!("read outside the AC'97 windows: {address:#x}");
        }
    }

    fn write(&self, address: u16, value: u32) {
        let mut state = self.state();
        if (MIXER_BASE..MIXER_BASE + 0x80).contains(&address) {
            state.write_mixer(address - MIXER_BASE, value as u16)
        } else if (BUS_BASE..BUS_BASE + 0x40).contains(&address) {
            state.write_bus(address - BUS_BASE, value)
        } else {
            panic!("write outside the AC'97 windows: {address:#x}");
        }
    }

    // ── Inspection ────────────────────────────────────────────────────

    pub fn mixer_reg(&self, offset: u16) -> u16 {
        self.state().read_mixer(offset)
    }

    pub fn mixer_resets(&self) -> usize {
        self.state().mixer_resets
    }

    pub fn dac_rate_writes(&self) -> usize {
        self.state().dac_rate_writes
    }

    pub fn global_control(&self) -> u32 {
        self.state().global_control
    }

    pub fn channel_control(&self) -> u8 {
        self.state().control
    }

    pub fn descriptor_list_base(&self) -> u32 {
        self.state().descriptor_list_base
    }

    pub fn current_index(&self) -> u8 {
        self.state().current_index
    }

    pub fn last_valid_index(&self) -> u8 {
        self.state().last_valid_index
    }

    pub fn status(&self) -> Status {
        Status::from_bits_retain(self.state().status)
    }

    pub fn interrupt_pending(&self) -> bool {
        self.status().intersects(Status::INTERRUPT_ACK)
    }

    // ── Hardware behavior ─────────────────────────────────────────────

    /// Number of control register reads that still see the reset bit after
    /// a channel reset is requested.
    pub fn set_reset_latency(&self, reads: u32) {
        self.state().reset_latency = reads;
    }

    /// The engine finishes the buffer under CIV. Moves CIV forward, or halts
    /// when that buffer was the last valid one.
    pub fn complete_buffer(&self) {
        let mut state = self.state();
        if !state.running() || state.halted() {
            return;
        }
        if state.current_index == state.last_valid_index {
            state.status |= (Status::DMA_HALTED
                | Status::CURRENT_EQUALS_LAST_VALID
                | Status::LAST_VALID_BUFFER_COMPLETION
                | Status::BUFFER_COMPLETION)
                .bits();
        } else {
            state.current_index = (state.current_index + 1) & bus::INDEX_MASK;
            state.status |= Status::BUFFER_COMPLETION.bits();
        }
    }

    pub fn raise_fifo_error(&self) {
        self.state().status |= Status::FIFO_ERROR.bits();
    }

    /// Latch arbitrary status bits (e.g. a completion without any progress).
    pub fn raise_status(&self, bits: Status) {
        self.state().status |= bits.bits();
    }
}

impl RegisterIo for SimAc97 {
    fn read_u8(&self, address: u16) -> u8 {
        self.read(address) as u8
    }
    fn read_u16(&self, address: u16) -> u16 {
        self.read(address) as u16
    }
    fn read_u32(&self, address: u16) -> u32 {
        self.read(address)
    }
    fn write_u8(&self, address: u16, value: u8) {
        self.write(address, value as u32)
    }
    fn write_u16(&self, address: u16, value: u16) {
        self.write(address, value as u32)
    }
    fn write_u32(&self, address: u16, value: u32) {
        self.write(address, value)
    }
}

// ── DMA memory ─────────────────────────────────────────────────────────────

pub struct HeapDmaBuffer {
    pages: Vec<Vec<u8>>,
    physical: PhysAddr,
}

impl DmaBuffer for HeapDmaBuffer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> &[u8] {
        &self.pages[index]
    }

    fn page_mut(&mut self, index: usize) -> &mut [u8] {
        &mut self.pages[index]
    }

    fn physical_page(&self, index: usize) -> PhysAddr {
        self.physical + (index * PAGE_SIZE) as PhysAddr
    }
}

struct AllocState {
    physical_base: PhysAddr,
    next_physical: PhysAddr,
    fail_remaining: usize,
    page_shortfall: usize,
    allocations: Vec<(&'static str, usize)>,
}

/// Heap-backed allocator handing out physically "contiguous" page runs.
/// Clones share state so tests can inspect an allocator moved into a driver.
#[derive(Clone)]
pub struct HeapDmaAllocator {
    state: Arc<Mutex<AllocState>>,
}

impl HeapDmaAllocator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AllocState {
                physical_base: 0x0010_0000,
                next_physical: 0x0010_0000,
                fail_remaining: 0,
                page_shortfall: 0,
                allocations: Vec::new(),
            })),
        }
    }

    pub fn with_physical_base(self, base: PhysAddr) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.physical_base = base;
            state.next_physical = base;
        }
        self
    }

    /// Return this many fewer pages than requested.
    pub fn with_page_shortfall(self, pages: usize) -> Self {
        self.state.lock().unwrap().page_shortfall = pages;
        self
    }

    /// Fail the next `count` allocations.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().fail_remaining = count;
    }

    pub fn physical_base(&self) -> PhysAddr {
        self.state.lock().unwrap().physical_base
    }

    /// Successful allocations as `(name, pages)`.
    pub fn allocations(&self) -> Vec<(&'static str, usize)> {
        self.state.lock().unwrap().allocations.clone()
    }
}

impl DmaAllocator for HeapDmaAllocator {
    type Buffer = HeapDmaBuffer;

    fn allocate_dma_pages(&mut self, pages: usize, name: &'static str) -> Option<HeapDmaBuffer> {
        let mut state = self.state.lock().unwrap();
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            return None;
        }
        let count = pages.saturating_sub(state.page_shortfall);
        let physical = state.next_physical;
        state.next_physical += (pages * PAGE_SIZE) as PhysAddr;
        state.allocations.push((name, pages));
        Some(HeapDmaBuffer {
            pages: vec![vec![0u8; PAGE_SIZE]; count],
            physical,
        })
    }
}

// ── Interrupt exclusion ────────────────────────────────────────────────────

struct SyncState {
    critical: bool,
    waiters: usize,
    generation: u64,
    wakes: u64,
}

/// `IrqSync` for host tests. The critical section is a flag guarded by a
/// mutex; a simulated interrupt must enter it before calling the handler,
/// just as a real interrupt cannot be delivered while it is held.
pub struct StdIrqSync {
    state: Mutex<SyncState>,
    cond: Condvar,
}

impl StdIrqSync {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SyncState {
                critical: false,
                waiters: 0,
                generation: 0,
                wakes: 0,
            }),
            cond: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap()
    }

    pub fn in_critical(&self) -> bool {
        self.lock().critical
    }

    pub fn waiters(&self) -> usize {
        self.lock().waiters
    }

    /// Number of `wake_all` calls so far.
    pub fn wakes(&self) -> u64 {
        self.lock().wakes
    }

    /// Block until at least `count` callers are parked. Panics after 5 s.
    pub fn wait_for_waiters(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.waiters() < count {
            assert!(Instant::now() < deadline, "timed out waiting for {count} waiters");
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl IrqSync for StdIrqSync {
    fn enter_critical(&self) {
        let mut state = self.lock();
        while state.critical {
            state = self.cond.wait(state).unwrap();
        }
        state.critical = true;
    }

    fn leave_critical(&self) {
        self.lock().critical = false;
        self.cond.notify_all();
    }

    fn wait(&self, timeout: Option<Duration>) -> WaitOutcome {
        let mut state = self.lock();
        let generation = state.generation;
        state.waiters += 1;
        state.critical = false;
        self.cond.notify_all();

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut outcome = WaitOutcome::Woken;
        while state.generation == generation {
            match deadline {
                None => state = self.cond.wait(state).unwrap(),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.waiters -= 1;
                        outcome = WaitOutcome::TimedOut;
                        break;
                    }
                    state = self.cond.wait_timeout(state, deadline - now).unwrap().0;
                }
            }
        }

        while state.critical {
            state = self.cond.wait(state).unwrap();
        }
        state.critical = true;
        outcome
    }

    fn wake_all(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.waiters = 0;
        state.wakes += 1;
        self.cond.notify_all();
    }

    fn has_waiters(&self) -> bool {
        self.lock().waiters > 0
    }
}

// ── Delay and PCI ──────────────────────────────────────────────────────────

/// Delay provider that only accumulates the requested time.
#[derive(Clone, Default)]
pub struct NoDelay {
    total_ns: Arc<AtomicU64>,
}

impl NoDelay {
    pub fn total_us(&self) -> u64 {
        self.total_ns.load(Ordering::Relaxed) / 1_000
    }
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(ns as u64, Ordering::Relaxed);
    }
}

/// `BusControl` that records which operations ran, in order.
#[derive(Default)]
pub struct RecordingBus {
    pub calls: Vec<&'static str>,
}

impl BusControl for RecordingBus {
    fn enable_pin_based_interrupts(&mut self) {
        self.calls.push("pin_interrupts");
    }

    fn enable_bus_mastering(&mut self) {
        self.calls.push("bus_mastering");
    }

    fn enable_irq(&mut self) {
        self.calls.push("irq");
    }
}
