bitflags::bitflags! {
    /// The instruction-set extensions this package can detect and report.
    ///
    /// The set of extensions is fixed: these are the ones that vectorized code paths
    /// elsewhere in the system dispatch on. Detection only - nothing here selects a code
    /// path.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct InstructionSet: u64 {
        /// Supplemental Streaming SIMD Extensions 3.
        const SSSE3 = 1 << 0;

        /// Streaming SIMD Extensions 4.1.
        const SSE4_1 = 1 << 1;

        /// Streaming SIMD Extensions 4.2.
        const SSE4_2 = 1 << 2;

        /// The `popcnt` population-count instruction.
        const POPCNT = 1 << 3;

        /// Advanced Vector Extensions.
        const AVX = 1 << 4;

        /// Advanced Vector Extensions 2.
        const AVX2 = 1 << 5;

        /// AVX-512 Foundation.
        const AVX512F = 1 << 6;

        /// AVX-512 Byte and Word instructions.
        const AVX512BW = 1 << 7;
    }
}

/// The kernel's name for each extension, as it appears in the `flags` line of
/// `/proc/cpuinfo`, paired with the corresponding set.
const FLAG_NAMES: [(&str, InstructionSet); 8] = [
    ("ssse3", InstructionSet::SSSE3),
    ("sse4_1", InstructionSet::SSE4_1),
    ("sse4_2", InstructionSet::SSE4_2),
    ("popcnt", InstructionSet::POPCNT),
    ("avx", InstructionSet::AVX),
    ("avx2", InstructionSet::AVX2),
    ("avx512f", InstructionSet::AVX512F),
    ("avx512bw", InstructionSet::AVX512BW),
];

impl InstructionSet {
    /// The extensions the current build was compiled assuming are present.
    ///
    /// Comparing this against runtime detection identifies hosts that cannot actually
    /// execute the most specialized code paths in the binary.
    pub const BUILD_ASSUMED: Self = build_assumed();

    /// Parses the extensions named in free-form feature text, such as the `flags` line
    /// of `/proc/cpuinfo`.
    ///
    /// Matching is a case-sensitive substring search per extension name: `avx2` anywhere
    /// in the text sets [`InstructionSet::AVX2`]. No word boundaries are enforced, so a
    /// token that merely embeds a name also matches (and `avx2` in the text necessarily
    /// also sets [`InstructionSet::AVX`]). Unrecognized tokens are ignored; parsing
    /// cannot fail.
    #[must_use]
    pub fn from_feature_text(text: &str) -> Self {
        let mut sets = Self::empty();

        for (name, set) in FLAG_NAMES {
            if text.contains(name) {
                sets |= set;
            }
        }

        sets
    }

    /// The kernel names of the extensions in this set, in table order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        FLAG_NAMES
            .into_iter()
            .filter(move |(_, set)| self.contains(*set))
            .map(|(name, _)| name)
    }
}

const fn build_assumed() -> InstructionSet {
    let mut sets = InstructionSet::empty();

    #[cfg(all(target_arch = "x86_64", target_feature = "ssse3"))]
    {
        sets = sets.union(InstructionSet::SSSE3);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "sse4.1"))]
    {
        sets = sets.union(InstructionSet::SSE4_1);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "sse4.2"))]
    {
        sets = sets.union(InstructionSet::SSE4_2);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "popcnt"))]
    {
        sets = sets.union(InstructionSet::POPCNT);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    {
        sets = sets.union(InstructionSet::AVX);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        sets = sets.union(InstructionSet::AVX2);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "avx512f"))]
    {
        sets = sets.union(InstructionSet::AVX512F);
    }
    #[cfg(all(target_arch = "x86_64", target_feature = "avx512bw"))]
    {
        sets = sets.union(InstructionSet::AVX512BW);
    }

    sets
}
