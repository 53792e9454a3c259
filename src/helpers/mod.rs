//! Low-level readers shared by the document parser: ZIP part lookup, XML events,
//! OLE compound-file directories and little-endian field decoding.
pub(crate) mod cfb;
pub(crate) mod string;
pub(crate) mod xml;
pub(crate) mod zip;
