//! Skybox assets: the six face images the scene background is built from.
//!
//! Faces live side by side in one directory as `skybox_0.png` ..
//! `skybox_5.png`, ordered +X, -X, +Y, -Y, +Z, -Z. That is also the layer
//! order of a GPU cube texture, so face `n` uploads to layer `n`.
//!
//! # Invariants
//! - A loaded skybox always has six square RGBA8 faces of the same size.

use std::path::{Path, PathBuf};

/// Errors from loading skybox faces.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("skybox face {face:?} is missing: {path}")]
    MissingFace { face: SkyboxFace, path: PathBuf },
    #[error("skybox face {face:?} is {width}x{height}, faces must be square")]
    NotSquare {
        face: SkyboxFace,
        width: u32,
        height: u32,
    },
    #[error("skybox face {face:?} is {size}px, expected {expected}px like the first face")]
    SizeMismatch {
        face: SkyboxFace,
        size: u32,
        expected: u32,
    },
}

/// One face of the skybox cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkyboxFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl SkyboxFace {
    pub const ALL: [SkyboxFace; 6] = [
        SkyboxFace::PositiveX,
        SkyboxFace::NegativeX,
        SkyboxFace::PositiveY,
        SkyboxFace::NegativeY,
        SkyboxFace::PositiveZ,
        SkyboxFace::NegativeZ,
    ];

    /// Cube texture array layer for this face.
    pub fn layer(self) -> u32 {
        self as u32
    }

    pub fn file_name(self) -> String {
        format!("skybox_{}.png", self.layer())
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Decoded RGBA8 pixels of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("loaded image {width}x{height} from {}", path.display());
        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Bytes per row of tightly packed RGBA8 pixels.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// The six decoded faces of a skybox, indexed by [`SkyboxFace::layer`].
#[derive(Debug, Clone)]
pub struct SkyboxImages {
    faces: Vec<ImageData>,
    size: u32,
}

impl SkyboxImages {
    /// Load and validate all six faces from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let mut faces = Vec::with_capacity(SkyboxFace::ALL.len());
        for face in SkyboxFace::ALL {
            let path = face.path_in(dir);
            if !path.is_file() {
                return Err(AssetError::MissingFace { face, path });
            }
            faces.push(ImageData::from_file(&path)?);
        }
        let skybox = Self::from_faces(faces)?;
        tracing::info!(
            "loaded skybox from {} ({}px faces)",
            dir.display(),
            skybox.size
        );
        Ok(skybox)
    }

    /// Build from already decoded faces in layer order.
    pub fn from_faces(faces: Vec<ImageData>) -> Result<Self, AssetError> {
        let mut expected = None;
        for (face, image) in SkyboxFace::ALL.into_iter().zip(&faces) {
            if image.width != image.height {
                return Err(AssetError::NotSquare {
                    face,
                    width: image.width,
                    height: image.height,
                });
            }
            match expected {
                None => expected = Some(image.width),
                Some(size) if size != image.width => {
                    return Err(AssetError::SizeMismatch {
                        face,
                        size: image.width,
                        expected: size,
                    });
                }
                Some(_) => {}
            }
        }
        if faces.len() < SkyboxFace::ALL.len() {
            let face = SkyboxFace::ALL[faces.len()];
            return Err(AssetError::MissingFace {
                face,
                path: PathBuf::from(face.file_name()),
            });
        }
        Ok(Self {
            size: expected.unwrap_or(0),
            faces,
        })
    }

    /// Edge length of every face in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self, face: SkyboxFace) -> &ImageData {
        &self.faces[face.layer() as usize]
    }

    pub fn faces(&self) -> impl Iterator<Item = (SkyboxFace, &ImageData)> {
        SkyboxFace::ALL.into_iter().zip(&self.faces)
    }
}

/// Result of checking one face file without keeping its pixels.
#[derive(Debug)]
pub struct FaceStatus {
    pub face: SkyboxFace,
    pub path: PathBuf,
    pub result: Result<(u32, u32), AssetError>,
}

impl std::fmt::Display for FaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.result {
            Ok((w, h)) => write!(f, "{:?} {} ok {w}x{h}", self.face, self.path.display()),
            Err(e) => write!(f, "{:?} {} FAILED: {e}", self.face, self.path.display()),
        }
    }
}

/// Check every face in `dir`, reporting each one independently.
pub fn check_dir(dir: impl AsRef<Path>) -> Vec<FaceStatus> {
    let dir = dir.as_ref();
    SkyboxFace::ALL
        .into_iter()
        .map(|face| {
            let path = face.path_in(dir);
            let result = if path.is_file() {
                ImageData::from_file(&path).map(|img| (img.width, img.height))
            } else {
                Err(AssetError::MissingFace {
                    face,
                    path: path.clone(),
                })
            };
            FaceStatus { face, path, result }
        })
        .collect()
}

pub fn crate_info() -> &'static str {
    concat!("tideview-assets v", env!("CARGO_PKG_VERSION"))
}
