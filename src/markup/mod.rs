/*!
 * Markup transformation for vault documents.
 *
 * - `segments`: code-fence aware splitting
 * - `rewriter`: link, embed and highlight rewriting
 * - `video`: video placeholder resolution after rendering
 * - `frontmatter`: front-matter based exclusion
 */

pub mod frontmatter;
pub mod rewriter;
pub mod segments;
pub mod video;

pub use frontmatter::{extract_frontmatter, should_exclude};
pub use rewriter::{RewriteResult, rewrite};
pub use segments::{Segment, SegmentKind, segment};
pub use video::{VideoReference, resolve_embed, substitute_video_embeds};
