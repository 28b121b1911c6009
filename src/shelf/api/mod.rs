//! Media server boundary: domain records, the [`MediaApi`] trait, and the queued
//! call/reply types the application exchanges with it.

mod client;
mod http;
mod records;

#[cfg(test)]
pub(crate) use client::fake;

pub use client::{
    AfterLoad, ApiCall, ApiError, ApiPayload, ApiReply, ApiResult, MediaApi, Request, dispatch,
};
pub use http::{HttpMediaApi, HttpRequest, HttpResponse, Method, Transport};
pub use records::{
    Author, AudioTrack, BookHit, DeviceInfo, Item, ItemQuery, Library, Media, Metadata, Progress,
    SearchResults, Series, SeriesHit, Session, SessionReport,
};
