//! Built-in constant catalog.
//!
//! Mass ratios are current/pole masses in MeV divided by `m_e = 0.511 MeV`.
//! Precision ratios carry their CODATA uncertainties so the report can show
//! how many standard deviations a lattice point misses by.

use crate::domain::{BuiltinSet, Constant, ConstantGroup};

/// Electron mass (MeV) used as the denominator for mass ratios.
pub const ELECTRON_MASS_MEV: f64 = 0.511;

const MASSES_MEV: [(&str, f64); 12] = [
    ("up", 2.16),
    ("down", 4.67),
    ("strange", 93.0),
    ("charm", 1270.0),
    ("bottom", 4180.0),
    ("top", 172_760.0),
    ("muon", 105.66),
    ("tau", 1776.86),
    ("W", 80_377.0),
    ("Z", 91_188.0),
    ("Higgs", 125_250.0),
    ("proton", 938.27),
];

const COUPLINGS: [(&str, f64); 3] = [
    ("1/alpha", 137.036),
    ("alpha_s", 0.1179),
    ("sin2_theta_W", 0.2312),
];

const CKM: [(&str, f64); 6] = [
    ("V_us", 0.2245),
    ("V_cd", 0.221),
    ("V_cb", 0.0410),
    ("V_ub", 0.00382),
    ("V_td", 0.0080),
    ("V_ts", 0.0388),
];

/// `(name, value, uncertainty)`; zero uncertainty means "not quoted".
const RATIOS: [(&str, f64, f64); 4] = [
    ("mp/me", 1836.152_673_43, 0.000_000_11),
    ("1/alpha (CODATA)", 137.035_999_084, 0.000_000_021),
    ("mmu/me", 206.768_283_0, 0.000_004_6),
    ("M_Planck/M_weak", 4.96e16, 0.0),
];

/// All catalog constants selected by `set`, in catalog order.
pub fn builtin_constants(set: BuiltinSet) -> Vec<Constant> {
    let mut out = Vec::new();

    if set.includes(ConstantGroup::Mass) {
        out.extend(MASSES_MEV.iter().map(|(name, mev)| {
            Constant::new(format!("m_{name}/m_e"), mev / ELECTRON_MASS_MEV).in_group(ConstantGroup::Mass)
        }));
    }
    if set.includes(ConstantGroup::Coupling) {
        out.extend(
            COUPLINGS
                .iter()
                .map(|(name, v)| Constant::new(*name, *v).in_group(ConstantGroup::Coupling)),
        );
    }
    if set.includes(ConstantGroup::Ckm) {
        out.extend(
            CKM.iter()
                .map(|(name, v)| Constant::new(*name, *v).in_group(ConstantGroup::Ckm)),
        );
    }
    if set.includes(ConstantGroup::Ratio) {
        out.extend(RATIOS.iter().map(|(name, v, u)| {
            let c = Constant::new(*name, *v).in_group(ConstantGroup::Ratio);
            if *u > 0.0 { c.with_uncertainty(*u) } else { c }
        }));
    }

    out
}
