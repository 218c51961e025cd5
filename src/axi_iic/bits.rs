/// Bit `offset` of `word`; `offset` has to be below 32.
pub fn get_bit(word: u32, offset: u32) -> bool {
	0 != (word >> offset) & 1
}

/// Set or clear bit `offset` of `word`, leaving all other bits alone.
pub fn set_bit(word: &mut u32, offset: u32, value: bool) {
	let mask = 1u32 << offset;
	if value {
		*word |= mask;
	} else {
		*word &= !mask;
	}
}

#[cfg(test)]
mod test {
	use super::{
		get_bit,
		set_bit,
	};

	const WORDS: [u32; 6] = [0, !0, 0x5555_5555, 0xaaaa_aaaa, 0x0040_0104, 0x8000_0001];

	#[test]
	fn get_single_bits() {
		assert!(get_bit(0x80, 7));
		assert!(!get_bit(0x80, 6));
		assert!(get_bit(0x8000_0000, 31));
		assert!(get_bit(0x0000_0001, 0));
		assert!(!get_bit(0x7fff_ffff, 31));
	}

	#[test]
	fn set_then_clear_restores_other_bits() {
		for &w in WORDS.iter() {
			for offset in 0..32 {
				let mut set = w;
				set_bit(&mut set, offset, true);
				assert!(get_bit(set, offset));
				assert_eq!(set & !(1 << offset), w & !(1 << offset), "set touched other bits of 0x{:08x} at {}", w, offset);

				let mut cleared = set;
				set_bit(&mut cleared, offset, false);
				assert!(!get_bit(cleared, offset));
				assert_eq!(cleared, w & !(1 << offset));
				if !get_bit(w, offset) {
					assert_eq!(cleared, w);
				}
			}
		}
	}

	#[test]
	fn set_is_idempotent() {
		let mut w = 0x0000_0041;
		set_bit(&mut w, 0, true);
		set_bit(&mut w, 6, true);
		assert_eq!(w, 0x0000_0041);
		set_bit(&mut w, 1, false);
		assert_eq!(w, 0x0000_0041);
	}
}
