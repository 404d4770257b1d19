//! Lock-free SPSC ring between the audio callback and `listen`.
//!
//! `ringbuf::HeapRb<f32>` gives a wait-free `push_slice`, so the real-time
//! callback never blocks on the consumer.

pub mod chunk;

use ringbuf::{traits::Split, HeapRb};

pub use ringbuf::traits::{Consumer, Producer};

/// Producer half, owned by the audio callback.
pub type AudioProducer = ringbuf::HeapProd<f32>;

/// Consumer half, owned by the microphone source.
pub type AudioConsumer = ringbuf::HeapCons<f32>;

/// 2^20 f32 samples ≈ 21.8 s at 48 kHz. Capture runs ahead of `listen` only
/// while a recognition request is in flight.
pub const RING_CAPACITY: usize = 1 << 20;

pub fn create_audio_ring() -> (AudioProducer, AudioConsumer) {
    HeapRb::<f32>::new(RING_CAPACITY).split()
}
