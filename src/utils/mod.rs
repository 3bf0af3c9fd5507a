/*
 * utils/mod.rs - Utility Module for DDOS
 *
 * - locked: synchronization primitive for safe access to shared data
 *   Used by: memory allocator and other components requiring interior mutability
 */

pub mod locked;
