//! Flat byte serialization for process-to-process transfer.
//!
//! Fields are concatenated little-endian in a fixed order with no framing
//! and no version tag; both sides must agree on the exact field sequence.
//! This is a transfer format between two live ranks, not a storage format.

use crate::comm::ProcessGroup;

#[derive(Debug, Default)]
pub struct Serializer {
    buf: Vec<u8>,
    pos: usize,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer::default()
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Serializer { buf, pos: 0 }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn take(&mut self, n: usize) -> &[u8] {
        assert!(self.pos + n <= self.buf.len(), "serializer underrun");
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        bytes
    }

    pub fn pack_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }

    pub fn unpack_bool(&mut self) -> bool {
        self.take(1)[0] != 0
    }

    pub fn pack_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn unpack_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().expect("serializer underrun"))
    }

    pub fn pack_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn unpack_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take(4).try_into().expect("serializer underrun"))
    }

    pub fn pack_usize(&mut self, v: usize) {
        self.buf.extend_from_slice(&(v as u64).to_le_bytes());
    }

    pub fn unpack_usize(&mut self) -> usize {
        u64::from_le_bytes(self.take(8).try_into().expect("serializer underrun")) as usize
    }

    pub fn pack_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn unpack_f64(&mut self) -> f64 {
        f64::from_le_bytes(self.take(8).try_into().expect("serializer underrun"))
    }

    pub fn pack_i32_slice(&mut self, values: &[i32]) {
        self.pack_usize(values.len());
        for &v in values {
            self.pack_i32(v);
        }
    }

    pub fn unpack_i32_vec(&mut self) -> Vec<i32> {
        let n = self.unpack_usize();
        (0..n).map(|_| self.unpack_i32()).collect()
    }

    pub fn pack_usize_slice(&mut self, values: &[usize]) {
        self.pack_usize(values.len());
        for &v in values {
            self.pack_usize(v);
        }
    }

    pub fn unpack_usize_vec(&mut self) -> Vec<usize> {
        let n = self.unpack_usize();
        (0..n).map(|_| self.unpack_usize()).collect()
    }

    pub fn pack_f64_slice(&mut self, values: &[f64]) {
        self.pack_usize(values.len());
        for &v in values {
            self.pack_f64(v);
        }
    }

    pub fn unpack_f64_vec(&mut self) -> Vec<f64> {
        let n = self.unpack_usize();
        (0..n).map(|_| self.unpack_f64()).collect()
    }

    /// Move the packed bytes from rank `source` to rank `dest`. On `source`
    /// the buffer is sent as-is; on `dest` it is replaced by the received
    /// bytes with the read cursor rewound. A self-transfer only rewinds.
    pub fn send_recv(&mut self, comm: &ProcessGroup, source: usize, dest: usize) {
        if source == dest {
            self.pos = 0;
            return;
        }
        if comm.rank() == source {
            comm.send_bytes(dest, self.buf.clone());
        }
        if comm.rank() == dest {
            self.buf = comm.recv_bytes(source);
            self.pos = 0;
        }
    }
}
