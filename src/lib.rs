#![no_main]
#![no_std]

extern crate alloc;

pub mod actuators;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod runner;
pub mod sensors;
pub mod timer;

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;
use embedded_alloc::Heap;

use defmt_rtt as _; // global logger

use stm32f7xx_hal as _; // memory layout

use panic_probe as _;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// call once, before anything touches the heap
pub fn init_heap() {
    static mut HEAP_MEM: [MaybeUninit<u8>; config::HEAP_SIZE] =
        [MaybeUninit::uninit(); config::HEAP_SIZE];

    unsafe { HEAP.init(addr_of_mut!(HEAP_MEM) as usize, config::HEAP_SIZE) }
}

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

// Terminates the application and makes `probe-run` exit with exit-code = 0
pub fn exit() -> ! {
    loop {
        cortex_m::asm::bkpt();
    }
}
