//! CBOR persistence for atoms and bindings.
//!
//! Atoms are encoded through their [`AtomKind`](crate::core::AtomKind) and
//! decoded through their constructors, so every cached attribute (type,
//! constancy, depth, fingerprint, constant pool) is recomputed and sequences
//! are re-normalized on load. Native operator handlers are not encoded; a
//! decoded operator builds structural applications only.
//!
//! # References
//! - *CBOR*: [RFC 8949, Concise Binary Object Representation, 2020]

use crate::core::Atom;
use crate::outcome::Bindings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Serializes any value to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let bytes = serde_cbor::to_vec(value)?;
    Ok(bytes)
}

/// Deserializes a value from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Box<dyn std::error::Error>> {
    let value: T = serde_cbor::from_slice(bytes)?;
    Ok(value)
}

impl Atom {
    /// Serializes the atom to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        to_cbor(self)
    }

    /// Deserializes an atom from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        from_cbor(bytes)
    }

    /// Saves the atom to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let bytes = self.to_cbor()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads an atom from a file.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path)?;
        Self::from_cbor(&bytes)
    }
}

impl Bindings {
    /// Serializes the bindings to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        to_cbor(self)
    }

    /// Deserializes bindings from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use crate::props::AlgProp;
    use crate::sequence::AtomSeq;

    fn sample() -> Atom {
        let plus = Operator::builder("+")
            .props(
                AlgProp::builder()
                    .associative(true)
                    .commutative(true)
                    .identity(0)
                    .build()
                    .unwrap(),
            )
            .params([Atom::var("x"), Atom::var("y")])
            .result_type(Atom::integer_type())
            .build()
            .unwrap();
        let x = Atom::typed_var("x", Atom::integer_type());
        let lambda = Atom::lambda(&x, &x).unwrap();
        let args = AtomSeq::plain(vec![
            Atom::integer(3),
            Atom::var("k"),
            lambda,
            Atom::string("s"),
            Atom::float(2.5),
        ]);
        Atom::apply(&Atom::operator(plus), &Atom::seq(args)).unwrap()
    }

    #[test]
    fn atom_round_trip_preserves_fingerprint() {
        let atom = sample();
        let bytes = atom.to_cbor().unwrap();
        let decoded = Atom::from_cbor(&bytes).unwrap();
        assert_eq!(decoded.fingerprint(), atom.fingerprint());
        assert_eq!(decoded.depth(), atom.depth());
        assert_eq!(decoded.is_constant(), atom.is_constant());
        assert_eq!(decoded.ty(), atom.ty());
        assert_eq!(decoded.to_string(), atom.to_string());
    }

    #[test]
    fn bindings_round_trip() {
        let binds = Bindings::new()
            .with("a", sample())
            .with("b", Atom::boolean(true));
        let decoded = Bindings::from_cbor(&binds.to_cbor().unwrap()).unwrap();
        assert_eq!(decoded, binds);
    }

    #[test]
    fn illegal_properties_are_rejected_on_load() {
        #[derive(serde::Serialize)]
        struct RawProps {
            identity: Atom,
        }
        let bytes = to_cbor(&RawProps {
            identity: Atom::integer(0),
        })
        .unwrap();
        assert!(from_cbor::<AlgProp>(&bytes).is_err());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("acterm-persist-{}.cbor", std::process::id()));
        let atom = sample();
        atom.save_to_file(&path).unwrap();
        let loaded = Atom::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, atom);
    }
}
