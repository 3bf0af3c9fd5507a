/*
 * drivers/mod.rs - Device Driver Module for DDOS
 *
 * - uart: PL011 UART serial communication driver
 *   Used for: serial/debug output, communication with host via USB-serial cable
 */

pub mod uart;
