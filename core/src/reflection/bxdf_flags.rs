//! BxDF Flags

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Characterizes the lobes of a BxDF or of a single scattering sample.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BxDFFlags: u8 {
        /// No lobes.
        const UNSET = 0;

        /// Scatters into the hemisphere of the outgoing direction.
        const REFLECTION = 1 << 0;

        /// Scatters into the opposite hemisphere.
        const TRANSMISSION = 1 << 1;

        /// Spreads light over the whole hemisphere.
        const DIFFUSE = 1 << 2;

        /// Spreads light around a preferred direction.
        const GLOSSY = 1 << 3;

        /// Scatters light in a single direction.
        const SPECULAR = 1 << 4;

        const DIFFUSE_REFLECTION = Self::DIFFUSE.bits() | Self::REFLECTION.bits();
        const DIFFUSE_TRANSMISSION = Self::DIFFUSE.bits() | Self::TRANSMISSION.bits();
        const GLOSSY_REFLECTION = Self::GLOSSY.bits() | Self::REFLECTION.bits();
        const GLOSSY_TRANSMISSION = Self::GLOSSY.bits() | Self::TRANSMISSION.bits();
        const SPECULAR_REFLECTION = Self::SPECULAR.bits() | Self::REFLECTION.bits();
        const SPECULAR_TRANSMISSION = Self::SPECULAR.bits() | Self::TRANSMISSION.bits();

        const ALL = Self::DIFFUSE.bits()
            | Self::GLOSSY.bits()
            | Self::SPECULAR.bits()
            | Self::REFLECTION.bits()
            | Self::TRANSMISSION.bits();
    }
}

impl BxDFFlags {
    /// Returns true if the reflection flag is set.
    #[inline]
    pub fn is_reflective(&self) -> bool {
        self.intersects(Self::REFLECTION)
    }

    /// Returns true if the transmission flag is set.
    #[inline]
    pub fn is_transmissive(&self) -> bool {
        self.intersects(Self::TRANSMISSION)
    }

    /// Returns true if the diffuse flag is set.
    #[inline]
    pub fn is_diffuse(&self) -> bool {
        self.intersects(Self::DIFFUSE)
    }

    /// Returns true if the glossy flag is set.
    #[inline]
    pub fn is_glossy(&self) -> bool {
        self.intersects(Self::GLOSSY)
    }

    /// Returns true if the specular flag is set.
    #[inline]
    pub fn is_specular(&self) -> bool {
        self.intersects(Self::SPECULAR)
    }

    /// Returns true if there is a diffuse or glossy lobe.
    #[inline]
    pub fn is_non_specular(&self) -> bool {
        self.intersects(Self::DIFFUSE | Self::GLOSSY)
    }
}

impl fmt::Display for BxDFFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = vec![];
        for (flag, name) in [
            (Self::REFLECTION, "Reflection"),
            (Self::TRANSMISSION, "Transmission"),
            (Self::DIFFUSE, "Diffuse"),
            (Self::GLOSSY, "Glossy"),
            (Self::SPECULAR, "Specular"),
        ] {
            if self.contains(flag) {
                names.push(name);
            }
        }
        if names.is_empty() {
            write!(f, "Unset")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

bitflags! {
    /// Restricts sampling to reflection, transmission or both.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct BxDFReflTransFlags: u8 {
        const UNSET = 0;
        const REFLECTION = 1 << 0;
        const TRANSMISSION = 1 << 1;
        const ALL = Self::REFLECTION.bits() | Self::TRANSMISSION.bits();
    }
}

impl BxDFReflTransFlags {
    /// Returns true if reflection may be sampled.
    #[inline]
    pub fn allows_reflection(&self) -> bool {
        self.intersects(Self::REFLECTION)
    }

    /// Returns true if transmission may be sampled.
    #[inline]
    pub fn allows_transmission(&self) -> bool {
        self.intersects(Self::TRANSMISSION)
    }
}

impl Default for BxDFReflTransFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Describes whether the path carries radiance from lights or importance from
/// the camera. Non-symmetric scattering depends on it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransportMode {
    /// Indicates incident ray that intersected a point started at the camera.
    #[default]
    Radiance,

    /// Indicates incident ray that intersected a point started at the light
    /// source.
    Importance,
}

impl std::ops::Not for TransportMode {
    type Output = Self;

    /// Returns the adjoint transport mode.
    fn not(self) -> Self::Output {
        match self {
            Self::Radiance => Self::Importance,
            Self::Importance => Self::Radiance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_flags() {
        let unset = BxDFFlags::UNSET;
        assert!(!unset.is_diffuse());
        assert!(!unset.is_transmissive());
        assert!(!unset.is_non_specular());

        let gt = BxDFFlags::GLOSSY_TRANSMISSION;
        assert!(gt.is_glossy());
        assert!(gt.is_transmissive());
        assert!(!gt.is_reflective());
        assert!(gt.is_non_specular());

        let sr = BxDFFlags::SPECULAR_REFLECTION;
        assert!(sr.is_specular());
        assert!(!sr.is_non_specular());
        assert!(BxDFFlags::ALL.contains(gt | sr | BxDFFlags::DIFFUSE));
    }

    #[test]
    fn request_flags() {
        assert!(BxDFReflTransFlags::ALL.allows_reflection());
        assert!(BxDFReflTransFlags::ALL.allows_transmission());
        assert!(!BxDFReflTransFlags::REFLECTION.allows_transmission());
        assert!(!BxDFReflTransFlags::UNSET.allows_reflection());
    }

    #[test]
    fn transport_mode_flips() {
        assert_eq!(!TransportMode::Radiance, TransportMode::Importance);
        assert_eq!(!!TransportMode::Importance, TransportMode::Importance);
    }

    #[test]
    fn display_lists_lobes() {
        assert_eq!(format!("{}", BxDFFlags::GLOSSY_REFLECTION), "Reflection | Glossy");
        assert_eq!(format!("{}", BxDFFlags::UNSET), "Unset");
    }
}
