//! Prompt construction for the completion API.
//!
//! The format blocks embedded in these prompts reference the marker
//! constants from [`crate::parsing`], so the instructions given to the model
//! and the parser that consumes its output cannot drift apart.

use crate::parsing::{
    ARTIST_TAG, CATEGORY_TAG, ITEMS_TAG, SONG_TAG, STYLE_END_MARKER, STYLE_START_MARKER, STYLE_TAG,
};
use crate::types::{TimeRange, Track};
use std::fmt::Write;

/// System prompt for the taste-analysis completion.
pub const TASTE_ANALYSIS_SYSTEM_PROMPT: &str = "You are a brutally honest, sharp-tongued critic who seamlessly blends music analysis with aesthetic recommendations. You're daring, profane, and don't hold back on controversial takes, but you're also smart about connecting someone's musical taste to their style choices. You understand that music reveals personality, vibe, and aesthetic sensibility. You start by roasting their musical taste with intelligence and variance - if someone has good taste, you call them pretentious assholes rather than shitting on the music itself. If they have bad taste, you destroy it. If they're basic, you roast their predictability. If they're trying too hard, you call out their performative bullshit. Then you naturally transition into their aesthetic world, using their music choices to inform style recommendations. You use profanity liberally, make sharp observations, and deliver brutally honest critiques that flow naturally from music to style. You speak directly to the person in 'you' form and create a cohesive narrative that connects their musical identity to their aesthetic choices.";

/// System prompt for the song-suggestion completion.
pub const SONG_SUGGESTION_SYSTEM_PROMPT: &str = "You are a music expert with great taste and knowledge of Pitchfork album scores and critical reception. You understand different genres and can suggest songs that would genuinely appeal to users based on their listening history. You provide accurate song titles and artist names for songs that match their taste while potentially introducing them to quality music they might not have discovered yet.";

/// Render a numbered track list the way both prompts present it.
fn track_listing(tracks: &[Track], with_album: bool) -> String {
    let mut listing = String::new();
    for (index, track) in tracks.iter().enumerate() {
        if with_album {
            let _ = writeln!(
                listing,
                "{}. \"{}\" by {} (from album: {})",
                index + 1,
                track.name,
                track.artist_line(),
                track.album
            );
        } else {
            let _ = writeln!(
                listing,
                "{}. \"{}\" by {}",
                index + 1,
                track.name,
                track.artist_line()
            );
        }
    }
    listing
}

/// Build the taste-analysis user prompt.
///
/// Asks for a roast of the listening history followed by style
/// recommendations in the exact marker format the parser extracts.
#[must_use]
pub fn taste_analysis_prompt(display_name: &str, tracks: &[Track], time_range: TimeRange) -> String {
    format!(
        r#"Alright, let's dive into this person's musical psyche. I need you to analyze "{display_name}"'s music taste with some real depth and then seamlessly transition into what their aesthetic choices should be. Here's what they've been vibing to over {period}:

{listing}
Here's what I want from you - be brutally honest but smart about their musical taste:

- If they have genuinely good taste (classic albums, respected artists, diverse genres): Call them out for being pretentious assholes who probably name-drop bands to sound cool at parties. Roast their personality, not the music.
- If they have basic/mainstream taste: Tear into how predictable and boring they are, but acknowledge that at least they're not trying too hard.
- If they have genuinely bad taste (terrible pop, dated shit, problematic artists): Go absolutely savage on the music itself.
- If they're trying too hard to be different: Destroy them for their performative edge and fake depth.

BE MORE DARING:
- Use more profanity, be more offensive
- Don't hold back on controversial takes
- Call out specific problematic shit if you see it
- Be sharper with your observations

BUT ALSO BE SMART:
- If someone's taste is actually good, acknowledge it while roasting their pretentiousness
- If someone's taste is genuinely diverse and interesting, call them out for being insufferable know-it-alls
- Don't just default to "everything sucks" - that's lazy as fuck

Now here's the key part - after you've roasted their musical taste, naturally transition into their aesthetic world. Think about it: their music choices reveal their personality, their vibe, their entire aesthetic sensibility. Use that analysis to seamlessly flow into style recommendations.

For example, if they're into dark, brooding music, their style should match that energy. If they're all about mainstream pop, they probably need some help with their aesthetic choices. If they're pretentious music snobs, they probably dress like they're trying too hard too.

Use "you" form, curse like a sailor, and make it brutally honest but with actual thought behind it. No bullet points - just flowing paragraphs that naturally move from music critique to aesthetic recommendations.

After your analysis, provide specific product recommendations in this EXACT format:
{start}
{category} [category name]
{items} [specific item 1], [specific item 2], [specific item 3]
{style} [brief style description]

{category} [next category]
{items} [specific item 1], [specific item 2], [specific item 3]
{style} [brief style description]
{end}"#,
        period = time_range.human_readable(),
        listing = track_listing(tracks, true),
        start = STYLE_START_MARKER,
        category = CATEGORY_TAG,
        items = ITEMS_TAG,
        style = STYLE_TAG,
        end = STYLE_END_MARKER,
    )
}

/// Build the song-suggestion user prompt.
///
/// Asks for `limit` suggestions in the exact `SONG:`/`ARTIST:` line format
/// the parser folds back into pairs.
#[must_use]
pub fn song_suggestion_prompt(tracks: &[Track], limit: usize) -> String {
    format!(
        r#"You are a music expert with great taste. Based on this user's listening habits, suggest {limit} songs they would genuinely enjoy. Here are their top tracks:

{listing}
Use your intuition to suggest songs that match their taste while potentially expanding their horizons. Consider Pitchfork album scores and critical reception, but prioritize songs that would actually resonate with them based on their current preferences.

Format your response as:
{song} [song title]
{artist} [artist name]

{song} [next song title]
{artist} [next artist name]

Continue for all {limit} suggestions."#,
        listing = track_listing(tracks, false),
        song = SONG_TAG,
        artist = ARTIST_TAG,
    )
}
