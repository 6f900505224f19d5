pub mod depth;
pub mod gouraud;
pub mod phong;
pub mod shadowed;
