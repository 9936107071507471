//! Common types and type aliases used throughout the pipeline
//!
//! This module re-exports glam types for mathematical operations and provides
//! color conversion utilities shared by the material and palette layers.
//!
//! # Why glam?
//!
//! We use glam as our primary math library because:
//! - **Performance**: SIMD-optimized operations for vectors, matrices, and quaternions
//! - **Ecosystem**: Widely adopted in the Rust gamedev community (Bevy, wgpu, etc.)
//! - **API**: Clean, modern API with comprehensive mathematical operations

// Re-export glam types as our primary math types
pub use glam::{
    Mat3 as Matrix3x3, Mat4 as Matrix4x4, Quat as Quaternion, Vec2 as Vector2D, Vec3 as Vector3D,
    Vec4 as Vector4D,
};

/// RGB color type (alias for Vector3D)
pub type Color3D = Vector3D;

/// RGBA color type (alias for Vector4D)
pub type Color4D = Vector4D;

/// Format a linear-ish RGBA color as a lowercase `#rrggbb` hex string.
///
/// Components are clamped to `[0, 1]` before quantization; alpha is ignored.
#[inline]
pub fn color_to_hex(color: Color4D) -> String {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        quantize(color.x),
        quantize(color.y),
        quantize(color.z)
    )
}

/// Parse a `#rrggbb` or `#rrggbbaa` hex string into an RGBA color.
///
/// Returns `None` for malformed input. Missing alpha defaults to 1.0.
pub fn hex_to_color(hex: &str) -> Option<Color4D> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    let a = if digits.len() == 8 { channel(6..8)? } else { 1.0 };
    Some(Color4D::new(r, g, b, a))
}

// Mint integration (optional)
#[cfg(feature = "mint")]
mod mint_integration {
    use super::*;

    /// Trait for converting to mint types
    pub trait ToMint<T> {
        /// Convert this type to a mint type
        fn to_mint(self) -> T;
    }

    /// Trait for converting from mint types
    pub trait FromMint<T> {
        /// Convert from a mint type to this type
        fn from_mint(value: T) -> Self;
    }

    impl FromMint<mint::Vector3<f32>> for Vector3D {
        #[inline]
        fn from_mint(v: mint::Vector3<f32>) -> Self {
            Vector3D::new(v.x, v.y, v.z)
        }
    }

    impl ToMint<mint::Vector3<f32>> for Vector3D {
        #[inline]
        fn to_mint(self) -> mint::Vector3<f32> {
            mint::Vector3 {
                x: self.x,
                y: self.y,
                z: self.z,
            }
        }
    }

    impl FromMint<mint::Quaternion<f32>> for Quaternion {
        #[inline]
        fn from_mint(q: mint::Quaternion<f32>) -> Self {
            Quaternion::from_xyzw(q.v.x, q.v.y, q.v.z, q.s)
        }
    }

    impl ToMint<mint::Quaternion<f32>> for Quaternion {
        #[inline]
        fn to_mint(self) -> mint::Quaternion<f32> {
            mint::Quaternion {
                s: self.w,
                v: mint::Vector3 {
                    x: self.x,
                    y: self.y,
                    z: self.z,
                },
            }
        }
    }

    impl FromMint<mint::ColumnMatrix4<f32>> for Matrix4x4 {
        #[inline]
        fn from_mint(m: mint::ColumnMatrix4<f32>) -> Self {
            Matrix4x4::from_cols(
                Vector4D::new(m.x.x, m.x.y, m.x.z, m.x.w),
                Vector4D::new(m.y.x, m.y.y, m.y.z, m.y.w),
                Vector4D::new(m.z.x, m.z.y, m.z.z, m.z.w),
                Vector4D::new(m.w.x, m.w.y, m.w.z, m.w.w),
            )
        }
    }

    impl ToMint<mint::ColumnMatrix4<f32>> for Matrix4x4 {
        #[inline]
        fn to_mint(self) -> mint::ColumnMatrix4<f32> {
            let cols = self.to_cols_array_2d();
            mint::ColumnMatrix4 {
                x: mint::Vector4 {
                    x: cols[0][0],
                    y: cols[0][1],
                    z: cols[0][2],
                    w: cols[0][3],
                },
                y: mint::Vector4 {
                    x: cols[1][0],
                    y: cols[1][1],
                    z: cols[1][2],
                    w: cols[1][3],
                },
                z: mint::Vector4 {
                    x: cols[2][0],
                    y: cols[2][1],
                    z: cols[2][2],
                    w: cols[2][3],
                },
                w: mint::Vector4 {
                    x: cols[3][0],
                    y: cols[3][1],
                    z: cols[3][2],
                    w: cols[3][3],
                },
            }
        }
    }
}

// Re-export the traits for public use when mint feature is enabled
#[cfg(feature = "mint")]
pub use mint_integration::{FromMint, ToMint};
