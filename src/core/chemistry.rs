/// Element symbols ordered by atomic number (index 0 = H).
const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// First atomic number (Sc) for which the def2 basis sets need an
/// effective core potential.
pub const ECP_THRESHOLD: u8 = 21;

/// Looks up the atomic number for an element symbol.
/// Matching ignores case, so "FE", "fe" and "Fe" all resolve to 26.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    let s = symbol.trim();
    SYMBOLS
        .iter()
        .position(|known| known.eq_ignore_ascii_case(s))
        .map(|i| (i + 1) as u8)
}

/// Canonical symbol for an atomic number, e.g. 26 -> "Fe".
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    let idx = (atomic_number as usize).checked_sub(1)?;
    SYMBOLS.get(idx).copied()
}

/// True if any atom is heavy enough to require `def2-ECP`.
pub fn needs_ecp(atomic_numbers: &[u8]) -> bool {
    atomic_numbers.iter().any(|&z| z >= ECP_THRESHOLD)
}
