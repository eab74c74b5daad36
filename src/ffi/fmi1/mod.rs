//! Raw FMI 1.0 C ABI, split into the Model Exchange (`me`) and
//! Co-Simulation (`cs`) function-pointer tables — FMI 1.0 ships these as two
//! entirely separate binaries/headers (`fmi_me.h`/`fmi_cs.h`), unlike FMI
//! 2.0 which unifies both variants behind one `fmi2*` symbol set.

pub mod cs;
pub mod me;
