/// First port the preview server tries.
pub const PORT: u16 = 8001;
